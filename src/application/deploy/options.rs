//! Deploy Options
//!
//! Configuration types for deploy operations.

use crate::config::Settings;
use crate::domain::entities::ParameterOverrides;

/// Options for the deployment executor
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOptions {
    /// Maximum attempts; only `Failed` outcomes are retried
    pub retry_limit: u32,
    /// Parameter defaults injected when the template declares them
    pub defaults: ParameterOverrides,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            retry_limit: 1,
            defaults: ParameterOverrides::new(),
        }
    }
}

impl DeployOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retry_limit: settings.retry_limit(),
            defaults: settings.default_parameters(),
        }
    }

    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit.max(1);
        self
    }

    pub fn with_defaults(mut self, defaults: ParameterOverrides) -> Self {
        self.defaults = defaults;
        self
    }
}
