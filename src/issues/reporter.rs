use std::collections::BTreeMap;

use super::{ErrorCode, Issue, IssueContext};

const UNKNOWN_CODE_TEMPLATE: &str = "Internal error: unrecognized issue code '{code}'";

/// Named values substituted into a code's message template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueParams(BTreeMap<&'static str, String>);

impl IssueParams {
    pub fn new() -> Self {
        IssueParams::default()
    }

    pub fn with<V: ToString>(mut self, key: &'static str, value: V) -> Self {
        self.0.insert(key, value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|v| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&&'static str, &String)> {
        self.0.iter()
    }
}

/// Build an issue for `code`. Never fails: unknown codes render the internal-error template,
/// keeping the original code text (and any parameters) in the result.
pub fn format_issue<C: Into<ErrorCode>>(code: C, params: &IssueParams) -> Issue {
    let code = code.into();
    let message = match code.template() {
        Some(template) => render(template, params),
        None => {
            let mut message = render(UNKNOWN_CODE_TEMPLATE, &params.clone().with("code", &code));
            if !params.is_empty() {
                let details = params
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<String>>()
                    .join(", ");
                message.push_str(&format!(" ({details})"));
            }
            tracing::warn!("[format_issue] unrecognized issue code {}", code);
            message
        }
    };
    Issue {
        severity: code.severity(),
        code,
        message,
        context: IssueContext::None,
    }
}

/// Fill `{name}` placeholders. Placeholders without a matching parameter are left as written.
fn render(template: &str, params: &IssueParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match params.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
