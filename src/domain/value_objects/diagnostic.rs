//! Provider diagnostic payload
//!
//! Mirrors the `{code, message, details[]}` error shape returned by
//! deployment providers for validation and deployment failures.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDiagnostic {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ProviderDiagnostic>,
}

impl ProviderDiagnostic {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            target: None,
            details: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_detail(mut self, detail: ProviderDiagnostic) -> Self {
        self.details.push(detail);
        self
    }

    /// Innermost messages, depth first, for compact reporting
    pub fn leaf_messages(&self) -> Vec<String> {
        if self.details.is_empty() {
            return vec![self.to_string()];
        }
        self.details
            .iter()
            .flat_map(ProviderDiagnostic::leaf_messages)
            .collect()
    }
}

impl std::fmt::Display for ProviderDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.is_empty(), &self.target) {
            (true, _) => write!(f, "{}", self.message),
            (false, Some(target)) => write!(f, "{} ({}): {}", self.code, target, self.message),
            (false, None) => write!(f, "{}: {}", self.code, self.message),
        }
    }
}
