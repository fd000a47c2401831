//! Structured issue records produced by schema checks, tag resolution and string validation.
//!
//! Issues are data, not errors: every check appends to an ordered `Vec<Issue>` in detection
//! order and keeps going. Each issue has one [`ErrorCode`], the severity that code implies, a
//! rendered message, and at most one [`IssueContext`].

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::span::Span;

pub mod codes;
pub mod reporter;

pub use codes::{ErrorCode, IssuePhase, Severity};
pub use reporter::{format_issue, IssueParams};

/// Where an issue was found. The variants are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    #[default]
    None,
    File {
        filename: String,
    },
    /// Tabular position. A span found before the enrichment is kept and refers to the cell.
    RowColumn {
        row: Option<usize>,
        column: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },
    Span {
        span: Span,
        text: String,
    },
    SidecarKey {
        key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub context: IssueContext,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Attach the substring of `source` covered by `span`.
    pub fn with_span(mut self, span: Span, source: &str) -> Self {
        self.context = IssueContext::Span {
            span,
            text: span.slice(source).to_string(),
        };
        self
    }

    pub fn in_file<S: Into<String>>(mut self, filename: S) -> Self {
        self.context = IssueContext::File {
            filename: filename.into(),
        };
        self
    }

    pub fn for_sidecar_key<S: Into<String>>(mut self, key: S) -> Self {
        self.context = IssueContext::SidecarKey { key: key.into() };
        self
    }

    /// Enrich an already-rendered issue with tabular position. The message gains a row/column
    /// prefix; the code, severity and any span within the cell are untouched.
    pub fn with_row_column(mut self, row: Option<usize>, column: Option<usize>) -> Self {
        let prefix = match (row, column) {
            (Some(r), Some(c)) => format!("Issue in row {r}, column {c}: "),
            (Some(r), None) => format!("Issue in row {r}: "),
            (None, Some(c)) => format!("Issue in column {c}: "),
            (None, None) => String::new(),
        };
        self.message = format!("{prefix}{}", self.message);
        self.context = IssueContext::RowColumn {
            row,
            column,
            span: self.span(),
        };
        self
    }

    pub fn span(&self) -> Option<Span> {
        match &self.context {
            IssueContext::Span { span, .. } => Some(*span),
            IssueContext::RowColumn { span, .. } => *span,
            _ => None,
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.code, self.message)?;
        match &self.context {
            IssueContext::None | IssueContext::RowColumn { span: None, .. } => Ok(()),
            IssueContext::File { filename } => write!(f, " (file {filename})"),
            IssueContext::Span { span, .. }
            | IssueContext::RowColumn {
                span: Some(span), ..
            } => write!(f, " (at {span})"),
            IssueContext::SidecarKey { key } => write!(f, " (sidecar key {key})"),
        }
    }
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(Issue::is_error)
}

/// Drop warnings, keeping detection order.
pub fn retain_errors(issues: &mut Vec<Issue>) {
    issues.retain(Issue::is_error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_column_enrichment_keeps_code() {
        let issue = format_issue(ErrorCode::TagEmpty, &IssueParams::new().with("index", 3))
            .with_span(Span::new(3, 4), "A, ,B")
            .with_row_column(Some(2), Some(1));
        assert_eq!(issue.code, ErrorCode::TagEmpty);
        assert_eq!(
            issue.message,
            "Issue in row 2, column 1: HED tags cannot be empty. Extra delimiter found at index 3"
        );
        assert_eq!(
            issue.context,
            IssueContext::RowColumn {
                row: Some(2),
                column: Some(1),
                span: Some(Span::new(3, 4)),
            }
        );
        assert_eq!(issue.span(), Some(Span::new(3, 4)));
        assert_eq!(
            issue.to_string(),
            "ERROR: TAG_EMPTY: Issue in row 2, column 1: HED tags cannot be empty. \
             Extra delimiter found at index 3 (at 3..4)"
        );

        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["context"]["kind"], "row_column");
        assert_eq!(json["context"]["span"]["start"], 3);

        let row_only = format_issue(ErrorCode::RequiredPrefixMissing, &IssueParams::new())
            .with_row_column(Some(5), None);
        assert_eq!(
            row_only.context,
            IssueContext::RowColumn {
                row: Some(5),
                column: None,
                span: None,
            }
        );
    }

    #[test]
    fn test_span_context() {
        let issue = format_issue(ErrorCode::CommaMissing, &IssueParams::new().with("tag", "Item"))
            .with_span(Span::new(0, 4), "Item(Event)");
        assert_eq!(issue.span(), Some(Span::new(0, 4)));
        assert!(matches!(&issue.context, IssueContext::Span { text, .. } if text == "Item"));
        assert_eq!(
            issue.to_string(),
            "ERROR: COMMA_MISSING: Comma missing after - 'Item' (at 0..4)"
        );
    }

    #[test]
    fn test_file_context() {
        let issue = format_issue(ErrorCode::SchemaInvalidCapitalization, &IssueParams::new())
            .in_file("schema.json");
        assert_eq!(
            issue.context,
            IssueContext::File {
                filename: "schema.json".to_string()
            }
        );
        assert!(issue.span().is_none());
        assert!(issue.to_string().ends_with(" (file schema.json)"));
    }

    #[test]
    fn test_issue_serializes_with_code_string() {
        let issue = format_issue(ErrorCode::TagExtended, &IssueParams::new())
            .for_sidecar_key("trial_type.go");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "TAG_EXTENDED");
        assert_eq!(json["severity"], "WARNING");
        assert_eq!(json["context"]["kind"], "sidecar_key");
        assert_eq!(json["context"]["key"], "trial_type.go");
    }

    #[test]
    fn test_retain_errors() {
        let mut issues = vec![
            format_issue(ErrorCode::TagExtended, &IssueParams::new()),
            format_issue(ErrorCode::TagEmpty, &IssueParams::new()),
        ];
        assert!(has_errors(&issues));
        retain_errors(&mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ErrorCode::TagEmpty);
    }
}
