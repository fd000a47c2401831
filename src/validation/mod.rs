//! Full-string validation.
//!
//! [`HedValidator`] runs the checks in a fixed order and accumulates every issue it finds:
//!
//! 1. raw-string syntax (characters, parentheses, delimiter order)
//! 2. tag resolution against the schema
//! 3. per-tag rules
//! 4. group rules, skipped when the parentheses do not pair up
//! 5. definition structure and `Def`/`Def-expand` references
//!
//! Nothing here fails on bad input; only constructing a validator over a schema that cannot
//! resolve tags is an error.

use crate::{
    config::{ColumnPrefix, ValidatorConfig},
    definitions::{check_definition_groups, DefinitionDict},
    error::HedError,
    issues::{retain_errors, Issue},
    schema::HedSchema,
    strings::{add_prefix_to_tags, HedString},
};

pub mod group_rules;
pub mod syntax;
pub mod tag_rules;
pub mod value_classes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// A complete annotation: required terms must be present.
    Complete,
    /// One cell of a row; required terms are checked across the row instead.
    Cell,
}

#[derive(Debug, Clone)]
pub struct HedValidator<'a> {
    schema: &'a HedSchema,
    definitions: Option<&'a DefinitionDict>,
    config: ValidatorConfig,
}

impl<'a> HedValidator<'a> {
    /// Fails with [`HedError::DuplicateTags`] when the schema's short names are ambiguous.
    pub fn new(schema: &'a HedSchema, config: ValidatorConfig) -> Result<Self, HedError> {
        schema.ensure_resolvable()?;
        Ok(HedValidator {
            schema,
            definitions: None,
            config,
        })
    }

    /// Check `Def` references against `definitions` instead of the definitions found in each
    /// string.
    pub fn with_definitions(mut self, definitions: &'a DefinitionDict) -> Self {
        self.definitions = Some(definitions);
        self
    }

    pub fn schema(&self) -> &'a HedSchema {
        self.schema
    }

    pub fn config(&self) -> ValidatorConfig {
        self.config
    }

    pub fn definitions(&self) -> Option<&'a DefinitionDict> {
        self.definitions
    }

    pub fn validate_string(&self, hed_string: &str) -> Vec<Issue> {
        self.run(hed_string, Scope::Complete)
    }

    /// Validate part of an annotation, such as a sidecar entry, without requiring the schema's
    /// required terms.
    pub fn validate_fragment(&self, hed_string: &str) -> Vec<Issue> {
        self.run(hed_string, Scope::Cell)
    }

    /// Validate one cell of tabular data; every issue gains the row/column prefix.
    pub fn validate_cell(
        &self,
        hed_string: &str,
        row: Option<usize>,
        column: Option<usize>,
    ) -> Vec<Issue> {
        self.validate_fragment(hed_string)
            .into_iter()
            .map(|issue| issue.with_row_column(row, column))
            .collect()
    }

    /// Validate the HED cells of one row. Each cell gets its column prefix (if any) first, then
    /// is validated on its own; required terms are checked across the whole row.
    pub fn validate_row<S: AsRef<str>>(
        &self,
        row: usize,
        cells: &[S],
        prefixes: &[ColumnPrefix],
    ) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut prefixed = Vec::with_capacity(cells.len());
        for (column, cell) in cells.iter().enumerate() {
            let cell = cell.as_ref();
            if cell.trim().is_empty() {
                continue;
            }
            let text = match prefixes.iter().find(|p| p.column == column) {
                Some(prefix) => add_prefix_to_tags(cell, &prefix.prefix),
                None => cell.to_string(),
            };
            issues.extend(self.validate_cell(&text, Some(row), Some(column)));
            prefixed.push(text);
        }

        if self.config.check_for_warnings {
            let joined = prefixed.join(", ");
            let (parsed, _) = HedString::parse(&joined).canonicalize(self.schema);
            let tags = parsed.tags();
            issues.extend(
                group_rules::check_required_tags(self.schema, &tags)
                    .into_iter()
                    .map(|issue| issue.with_row_column(Some(row), None)),
            );
        }
        issues
    }

    /// Validate the HED columns of tab-separated text whose first line is the header.
    ///
    /// Columns named `HED` are validated as written; columns listed in `prefixes` get their
    /// prefix first. `n/a` cells are empty. Rows are numbered by line, the header being line 1,
    /// and every issue keeps its row/column context.
    pub fn validate_tsv(&self, content: &str, prefixes: &[ColumnPrefix]) -> Vec<Issue> {
        let mut lines = content.lines();
        let Some(header) = lines.next() else {
            tracing::warn!("[HedValidator::validate_tsv] no header line");
            return Vec::new();
        };
        let header = header.split('\t').collect::<Vec<_>>();
        let hed_columns = header
            .iter()
            .enumerate()
            .filter(|(column, name)| {
                name.trim().eq_ignore_ascii_case("HED")
                    || prefixes.iter().any(|p| p.column == *column)
            })
            .map(|(column, _)| column)
            .collect::<Vec<_>>();
        if hed_columns.is_empty() {
            tracing::warn!("[HedValidator::validate_tsv] no HED columns in {header:?}");
        }

        let mut issues = Vec::new();
        for (row, line) in lines.enumerate().map(|(i, line)| (i + 2, line)) {
            let fields = line.split('\t').collect::<Vec<_>>();
            let cells = (0..header.len())
                .map(|column| {
                    if hed_columns.contains(&column) {
                        fields.get(column).copied().unwrap_or("").trim_matches('"')
                    } else {
                        ""
                    }
                })
                .map(|cell| if cell == "n/a" { "" } else { cell })
                .collect::<Vec<_>>();
            issues.extend(self.validate_row(row, &cells, prefixes));
        }
        issues
    }

    fn run(&self, hed_string: &str, scope: Scope) -> Vec<Issue> {
        let mut issues = syntax::check_invalid_characters(hed_string);
        let parentheses = syntax::check_parentheses(hed_string);
        let balanced = parentheses.is_none();
        issues.extend(parentheses);
        issues.extend(syntax::check_delimiters(hed_string));

        let (parsed, resolution) = HedString::parse(hed_string).canonicalize(self.schema);
        issues.extend(resolution);
        issues.extend(tag_rules::check_tags(
            self.schema,
            &parsed,
            self.config.allow_placeholders,
        ));

        if balanced {
            let tags = parsed.tags();
            issues.extend(group_rules::check_repeated_tags(&parsed));
            issues.extend(group_rules::check_unique_tags(self.schema, &tags));
            if scope == Scope::Complete {
                issues.extend(group_rules::check_required_tags(self.schema, &tags));
            }

            match self.definitions {
                Some(definitions) => {
                    let (_, structure) = check_definition_groups(self.schema, &parsed);
                    issues.extend(structure);
                    issues.extend(definitions.check_references(self.schema, &parsed));
                }
                None => {
                    let (definitions, found) = DefinitionDict::gather(self.schema, &[hed_string]);
                    issues.extend(found);
                    issues.extend(definitions.check_references(self.schema, &parsed));
                }
            }
        }

        if !self.config.check_for_warnings {
            retain_errors(&mut issues);
        }
        tracing::debug!(
            "[HedValidator::validate] {} issues in {:?}",
            issues.len(),
            hed_string
        );
        issues
    }
}

/// Validate with the default configuration. A schema with duplicate terms yields its
/// duplicate issues instead of any string-level result.
pub fn validate_hed_string(schema: &HedSchema, hed_string: &str) -> Vec<Issue> {
    match HedValidator::new(schema, ValidatorConfig::default()) {
        Ok(validator) => validator.validate_string(hed_string),
        Err(_) => schema.duplicate_issues(),
    }
}
