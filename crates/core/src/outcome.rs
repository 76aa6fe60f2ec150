use serde::{Deserialize, Serialize};

/// Severity of the issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
}

/// Type of issue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Invalid,
    Login,
    Forbidden,
    NotFound,
    Exception,
    Throttled,
}

/// JSON body returned by the HTTP layer for errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub severity: IssueSeverity,
    pub code: IssueType,
    pub diagnostics: String,
}

impl Outcome {
    pub fn error(code: IssueType, diagnostics: &str) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            diagnostics: diagnostics.to_string(),
        }
    }

    pub fn not_found(diagnostics: &str) -> Self {
        Self::error(IssueType::NotFound, diagnostics)
    }

    pub fn invalid(diagnostics: &str) -> Self {
        Self::error(IssueType::Invalid, diagnostics)
    }
}
