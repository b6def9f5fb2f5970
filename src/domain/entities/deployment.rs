//! Deployment entity
//!
//! A deployment moves through `Pending -> InProgress -> {Succeeded, Failed, Canceled}`.
//! Only `Succeeded` yields usable outputs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};
use crate::error::{DeployError, DeployResult};

/// Extra parameter values passed next to the parameter file
pub type ParameterOverrides = BTreeMap<String, Value>;

/// Lifecycle state of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeploymentState {
    #[default]
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl DeploymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Succeeded | DeploymentState::Failed | DeploymentState::Canceled
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentState::Succeeded)
    }

    /// Map a provider `provisioningState` string onto the lifecycle
    pub fn from_provisioning_state(state: &str) -> Self {
        match state.to_ascii_lowercase().as_str() {
            "succeeded" => DeploymentState::Succeeded,
            "failed" => DeploymentState::Failed,
            "canceled" | "cancelled" => DeploymentState::Canceled,
            "accepted" | "running" | "creating" | "updating" | "deleting" | "validating" => {
                DeploymentState::InProgress
            }
            _ => DeploymentState::Pending,
        }
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentState::Pending => "pending",
            DeploymentState::InProgress => "in progress",
            DeploymentState::Succeeded => "succeeded",
            DeploymentState::Failed => "failed",
            DeploymentState::Canceled => "canceled",
        };
        write!(f, "{}", s)
    }
}

/// Everything needed to validate or create one deployment
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentRequest {
    pub template_file: PathBuf,
    pub parameter_file: Option<PathBuf>,
    pub scope: TargetScope,
    pub location: String,
    pub overrides: ParameterOverrides,
    /// Explicit deployment name; generated from the template when `None`
    pub deployment_name: Option<String>,
}

impl DeploymentRequest {
    pub fn new(template_file: impl Into<PathBuf>, scope: TargetScope) -> Self {
        Self {
            template_file: template_file.into(),
            parameter_file: None,
            scope,
            location: String::new(),
            overrides: ParameterOverrides::new(),
            deployment_name: None,
        }
    }

    pub fn with_parameter_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.parameter_file = Some(path.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(name.into(), value);
        self
    }

    pub fn with_overrides(mut self, overrides: ParameterOverrides) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn with_deployment_name(mut self, name: impl Into<String>) -> Self {
        self.deployment_name = Some(name.into());
        self
    }
}

/// Failure detail of a deployment that did not succeed
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentFailure {
    pub state: DeploymentState,
    pub diagnostic: Option<ProviderDiagnostic>,
}

/// Output values keyed by name, in the order the template declares them
pub type Outputs = Map<String, Value>;

/// Typed outcome of a deployment; failure is data, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum DeploymentOutcome {
    Succeeded { outputs: Outputs },
    Failed(DeploymentFailure),
}

/// Result of a deployment attempt
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentResult {
    pub deployment_name: String,
    pub scope: TargetScope,
    pub outcome: DeploymentOutcome,
    /// Number of provider attempts made (1 unless retried)
    pub attempts: u32,
}

impl DeploymentResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, DeploymentOutcome::Succeeded { .. })
    }

    pub fn state(&self) -> DeploymentState {
        match &self.outcome {
            DeploymentOutcome::Succeeded { .. } => DeploymentState::Succeeded,
            DeploymentOutcome::Failed(failure) => failure.state,
        }
    }

    /// Output values; empty unless the deployment succeeded
    pub fn outputs(&self) -> Option<&Outputs> {
        match &self.outcome {
            DeploymentOutcome::Succeeded { outputs } => Some(outputs),
            DeploymentOutcome::Failed(_) => None,
        }
    }

    pub fn failure_detail(&self) -> Option<&DeploymentFailure> {
        match &self.outcome {
            DeploymentOutcome::Failed(failure) => Some(failure),
            DeploymentOutcome::Succeeded { .. } => None,
        }
    }

    /// All outputs as one JSON object (`deploymentOutput`)
    pub fn output_json(&self) -> Value {
        Value::Object(self.outputs().cloned().unwrap_or_default())
    }

    /// Treat a failed outcome as an error
    pub fn into_result(self) -> DeployResult<Self> {
        match self.outcome {
            DeploymentOutcome::Succeeded { .. } => Ok(self),
            DeploymentOutcome::Failed(failure) => Err(DeployError::Deployment {
                name: self.deployment_name,
                state: failure.state,
                diagnostic: failure.diagnostic,
            }),
        }
    }
}
