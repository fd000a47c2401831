//! hed CLI tool
//!
//! Command-line interface for validating and converting HED annotations with hed-core.
//!
//! ## Commands
//!
//! - `validate <strings>...`: Validate HED strings given on the command line
//! - `validate-file <path>`: Validate the HED columns of a tab-separated events file
//! - `validate-sidecar <path>`: Validate the HED strings of a BIDS JSON sidecar
//! - `convert <strings>...`: Rewrite HED strings in long or short form
//! - `check-schema [path]`: Report duplicate terms and naming problems in a schema
//!
//! ## Configuration
//!
//! Every command that needs a schema takes `--schema`. Without it, the schema path is read from
//! the configuration file (`--config`, default `hed.toml`). The same file carries validator
//! switches and the column prefixes used by `validate-file`.
//!
//! The process exits with status 1 when any error-severity issue was reported.

use clap::{Parser, Subcommand, ValueEnum};
use hed_core::{
    config::{ConfigProvider, HedConfig, TomlConfigProvider, ValidatorConfig},
    definitions::DefinitionDict,
    issues::{has_errors, Issue, IssueContext},
    schema::{check_compliance, load_schema},
    sidecar::{extract_hed_strings, validate_sidecar},
    strings::{convert_hed_string, TagForm},
    HedError, HedSchema, HedValidator,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hed")]
#[command(author, version, about = "A tool for validating and converting HED annotations", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "hed.toml")]
    config: PathBuf,

    /// Schema file (JSON or TOML); overrides the configuration file
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Print issues as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more HED strings
    Validate {
        /// HED strings to validate
        #[arg(required = true)]
        strings: Vec<String>,

        /// Report errors only
        #[arg(long)]
        no_warnings: bool,

        /// Accept `#` placeholders in values
        #[arg(long)]
        placeholders: bool,
    },

    /// Validate the HED columns of a tab-separated file
    ValidateFile {
        /// Path to the tab-separated file; the first line is the header
        path: PathBuf,

        /// Sidecar to read definitions from
        #[arg(long)]
        sidecar: Option<PathBuf>,

        /// Report errors only
        #[arg(long)]
        no_warnings: bool,
    },

    /// Validate the HED strings in a BIDS JSON sidecar
    ValidateSidecar {
        /// Path to the sidecar
        path: PathBuf,

        /// Report errors only
        #[arg(long)]
        no_warnings: bool,
    },

    /// Convert HED strings to long or short form
    Convert {
        /// HED strings to convert
        #[arg(required = true)]
        strings: Vec<String>,

        /// Target form
        #[arg(long, value_enum, default_value = "long")]
        form: Form,
    },

    /// Check a schema for duplicate terms and naming problems
    CheckSchema {
        /// Schema file; defaults to `--schema` or the configured schema
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Form {
    Long,
    Short,
}

impl From<Form> for TagForm {
    fn from(form: Form) -> TagForm {
        match form {
            Form::Long => TagForm::Long,
            Form::Short => TagForm::Short,
        }
    }
}

fn schema_for(cli_schema: Option<&Path>, config: &HedConfig) -> Result<HedSchema, HedError> {
    let path = cli_schema
        .map(Path::to_path_buf)
        .or_else(|| config.schema.clone())
        .ok_or_else(|| {
            HedError::Config("no schema given; pass --schema or set `schema` in the config".into())
        })?;
    tracing::info!("Loading schema from {path:?}");
    load_schema(path)
}

fn report(issues: &[Issue], json: bool) -> Result<(), HedError> {
    if json {
        println!("{}", serde_json::to_string_pretty(issues)?);
    } else {
        for issue in issues.iter() {
            println!("{issue}");
        }
    }
    Ok(())
}

/// Definitions declared anywhere in a sidecar, for validating the rows that use it.
fn sidecar_definitions(schema: &HedSchema, path: &Path) -> Result<DefinitionDict, HedError> {
    let content = hed_core::config::get_content(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let Some(sidecar) = value.as_object() else {
        return Err(HedError::Serialization(format!(
            "{path:?} is not a JSON object"
        )));
    };
    let (entries, _) = extract_hed_strings(schema, sidecar);
    let strings = entries.iter().map(|e| e.hed.as_str()).collect::<Vec<_>>();
    let (definitions, issues) = DefinitionDict::gather(schema, &strings);
    for issue in issues.iter() {
        tracing::warn!("{issue}");
    }
    Ok(definitions)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TomlConfigProvider::new(cli.config.clone()).load()?;
    let schema_path = match &cli.command {
        Commands::CheckSchema { path: Some(path) } => Some(path.clone()),
        _ => cli.schema.clone(),
    }
    .or_else(|| config.schema.clone());
    let schema = schema_for(schema_path.as_deref(), &config)?;
    let with_warnings = |no_warnings: bool| -> ValidatorConfig {
        if no_warnings {
            config.validation.errors_only()
        } else {
            config.validation
        }
    };

    let issues = match cli.command {
        Commands::Validate {
            strings,
            no_warnings,
            placeholders,
        } => {
            let mut settings = with_warnings(no_warnings);
            if placeholders {
                settings = settings.with_placeholders();
            }
            let validator = HedValidator::new(&schema, settings)?;
            let mut issues = Vec::new();
            for (i, hed) in strings.iter().enumerate() {
                let found = validator.validate_string(hed);
                if !cli.json {
                    println!("[{i}] {hed}: {} issue(s)", found.len());
                }
                issues.extend(found);
            }
            issues
        }
        Commands::ValidateFile {
            path,
            sidecar,
            no_warnings,
        } => {
            let definitions = match sidecar {
                Some(sidecar) => Some(sidecar_definitions(&schema, &sidecar)?),
                None => None,
            };
            let mut validator = HedValidator::new(&schema, with_warnings(no_warnings))?;
            if let Some(definitions) = definitions.as_ref() {
                validator = validator.with_definitions(definitions);
            }
            let content = hed_core::config::get_content(&path)?;
            if content.trim().is_empty() {
                return Err(HedError::Config(format!("{path:?} is empty")).into());
            }
            let issues = validator.validate_tsv(&content, &config.column_prefixes);
            if !cli.json {
                println!("{}: {} issue(s)", path.display(), issues.len());
            }
            issues
        }
        Commands::ValidateSidecar { path, no_warnings } => {
            let validator = HedValidator::new(&schema, with_warnings(no_warnings))?;
            let content = hed_core::config::get_content(&path)?;
            validate_sidecar(&validator, &content)?
        }
        Commands::Convert { strings, form } => {
            let mut issues = Vec::new();
            for hed in strings.iter() {
                let (converted, found) = convert_hed_string(&schema, hed, form.into());
                println!("{converted}");
                issues.extend(found);
            }
            issues
        }
        Commands::CheckSchema { .. } => {
            let filename = schema_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_default();
            let issues = check_compliance(&schema)
                .into_iter()
                .map(|issue| match issue.context {
                    IssueContext::None => issue.in_file(filename.clone()),
                    _ => issue,
                })
                .collect::<Vec<_>>();
            if !cli.json {
                println!(
                    "Schema {}: {} nodes, {} issue(s)",
                    schema.version(),
                    schema.len(),
                    issues.len()
                );
            }
            issues
        }
    };

    report(&issues, cli.json)?;
    if has_errors(&issues) {
        std::process::exit(1);
    }
    Ok(())
}
