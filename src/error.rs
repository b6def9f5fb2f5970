//! Error types for iacdeploy
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::DeploymentState;
use crate::domain::ports::ProviderError;
use crate::domain::value_objects::ProviderDiagnostic;

/// Result type alias for iacdeploy operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Main error type for iacdeploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// Template or parameter file does not exist
    #[error("file not found: {path}")]
    MissingTemplateFile { path: PathBuf },

    /// Placeholder left without a value while strict token mode is on.
    ///
    /// Lenient mode (the default) leaves unknown placeholders in place and
    /// never produces this error.
    #[error("no value for token(s) {} in {file}", .tokens.join(", "))]
    MissingTokenValue { file: PathBuf, tokens: Vec<String> },

    /// Provider rejected the template during validation
    #[error("template validation failed for {template}: {diagnostic}")]
    TemplateValidation {
        template: PathBuf,
        diagnostic: ProviderDiagnostic,
    },

    /// Deployment reached a non-success terminal state
    #[error("deployment '{name}' {state}{}", detail_suffix(.diagnostic))]
    Deployment {
        name: String,
        state: DeploymentState,
        diagnostic: Option<ProviderDiagnostic>,
    },

    /// Provider call failed outright
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Settings file could not be parsed or holds invalid values
    #[error("invalid settings in {file}: {message}")]
    InvalidSettings { file: PathBuf, message: String },

    /// Caller-supplied deployment name the provider would reject
    #[error("invalid deployment name '{name}': {reason}")]
    InvalidDeploymentName { name: String, reason: String },

    /// Template could not be read as a template
    #[error("invalid template {path}: {message}")]
    InvalidTemplate { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(diagnostic: &Option<ProviderDiagnostic>) -> String {
    match diagnostic {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}
