//! Settings type definitions
//!
//! Keys are camelCase in every supported format:
//!
//! ```yaml
//! parameterFileTokens:
//!   tokenPrefix: '<<'
//!   tokenSuffix: '>>'
//!   localTokens:
//!     - name: namePrefix
//!       value: carml
//! enableDefaultTelemetry: true
//! deployment:
//!   retryLimit: 2
//! provider:
//!   kind: local
//!   stateDir: .iacdeploy
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::entities::ParameterOverrides;
use crate::domain::services::project_defaults;
use crate::domain::value_objects::{
    ConfigWarning, TokenDelimiters, DEFAULT_TOKEN_PREFIX, DEFAULT_TOKEN_SUFFIX,
};
use crate::error::DeployResult;

use super::loader;

/// A named token defined in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalToken {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// `parameterFileTokens` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterFileTokens {
    #[serde(default = "default_prefix")]
    pub token_prefix: String,

    #[serde(default = "default_suffix")]
    pub token_suffix: String,

    #[serde(default)]
    pub local_tokens: Vec<LocalToken>,
}

impl Default for ParameterFileTokens {
    fn default() -> Self {
        Self {
            token_prefix: default_prefix(),
            token_suffix: default_suffix(),
            local_tokens: Vec::new(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_TOKEN_PREFIX.to_string()
}

fn default_suffix() -> String {
    DEFAULT_TOKEN_SUFFIX.to_string()
}

/// `deployment` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSettings {
    /// Maximum attempts for a deployment that ends `Failed`
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
        }
    }
}

fn default_retry_limit() -> u32 {
    1
}

/// Which provider implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// The `az` command-line client
    #[default]
    Az,
    /// File-backed simulated provider
    Local,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "az" | "azcli" | "az-cli" => Ok(ProviderKind::Az),
            "local" => Ok(ProviderKind::Local),
            other => Err(format!("unknown provider '{}' (expected 'az' or 'local')", other)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Az => write!(f, "az"),
            ProviderKind::Local => write!(f, "local"),
        }
    }
}

/// `provider` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default)]
    pub kind: ProviderKind,

    /// State directory of the local provider
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// Program used by the az provider
    #[serde(default = "default_az_path")]
    pub az_path: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            state_dir: None,
            az_path: default_az_path(),
        }
    }
}

fn default_az_path() -> String {
    "az".to_string()
}

/// Run settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub parameter_file_tokens: ParameterFileTokens,

    /// Project default for the opt-in telemetry template parameter
    #[serde(default)]
    pub enable_default_telemetry: Option<bool>,

    #[serde(default)]
    pub deployment: DeploymentSettings,

    #[serde(default)]
    pub provider: ProviderSettings,
}

impl Settings {
    /// Load settings from a YAML, JSON or TOML file
    pub fn load(path: &Path) -> DeployResult<Self> {
        let (settings, _warnings) = loader::load_with_warnings(path)?;
        Ok(settings)
    }

    /// Load settings and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Discover settings from the working directory, user config, or defaults
    pub fn discover(project_root: &Path) -> DeployResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(project_root)
    }

    /// Apply environment variable overrides (IACDEPLOY_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    pub fn delimiters(&self) -> TokenDelimiters {
        TokenDelimiters::new(
            self.parameter_file_tokens.token_prefix.clone(),
            self.parameter_file_tokens.token_suffix.clone(),
        )
    }

    /// Local tokens as `(name, value)` pairs
    pub fn local_tokens(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameter_file_tokens
            .local_tokens
            .iter()
            .map(|t| (t.name.as_str(), t.value.as_str()))
    }

    /// Template parameter defaults injected when the template declares them
    pub fn default_parameters(&self) -> ParameterOverrides {
        project_defaults(self.enable_default_telemetry)
    }

    /// Retry limit, never below one attempt
    pub fn retry_limit(&self) -> u32 {
        self.deployment.retry_limit.max(1)
    }
}
