//! Settings module for iacdeploy
//!
//! Settings hierarchy:
//! 1. CLI flags (highest priority, applied by the command layer)
//! 2. Environment variables (IACDEPLOY_*)
//! 3. Project settings (settings.yml / .yaml / .json / .toml in the working directory)
//! 4. User settings (<config_dir>/iacdeploy/settings.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use loader::{
    find_settings_file, parse_with_warnings, user_settings_path, SETTINGS_FILE_NAMES,
};
pub use types::{
    DeploymentSettings, LocalToken, ParameterFileTokens, ProviderKind, ProviderSettings, Settings,
};
