//! DeploymentProvider port - abstraction over the cloud deployment API
//!
//! The domain and application layers only see this trait. Concrete
//! providers live in `infrastructure::providers`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::entities::{DeploymentState, Outputs, ParameterOverrides};
use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors from talking to the provider (as opposed to a deployment failing)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider tool or state is not usable
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// External command exited unsuccessfully
    #[error("command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// Provider answered with something we could not interpret
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Deployment is unknown to the provider
    #[error("deployment '{0}' not found")]
    DeploymentNotFound(String),

    /// Operation is not supported by this provider
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identity the provider is operating as
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderContext {
    pub tenant_id: Option<String>,
    pub subscription_id: Option<String>,
}

/// What gets sent to the provider for validation or creation
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentSubmission {
    pub name: String,
    pub template_file: PathBuf,
    pub parameter_file: Option<PathBuf>,
    /// Applied on top of the parameter file
    pub parameters: ParameterOverrides,
    pub location: String,
}

/// Validation answer: `None` means the template is valid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub error: Option<ProviderDiagnostic>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self { error: None }
    }

    pub fn invalid(diagnostic: ProviderDiagnostic) -> Self {
        Self {
            error: Some(diagnostic),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// Output value as reported by the provider, wrapped with its type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputValue {
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub value: Value,
}

/// Wrapped outputs of a deployment, in the order the provider listed them
///
/// Serialized as a JSON object, which is how providers report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentOutputs(Vec<(String, OutputValue)>);

impl DeploymentOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an output; a replaced output keeps its position
    pub fn insert(&mut self, name: impl Into<String>, value: OutputValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OutputValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop the type wrappers
    pub fn into_values(self) -> Outputs {
        self.0.into_iter().map(|(n, v)| (n, v.value)).collect()
    }
}

impl FromIterator<(String, OutputValue)> for DeploymentOutputs {
    fn from_iter<I: IntoIterator<Item = (String, OutputValue)>>(iter: I) -> Self {
        let mut outputs = Self::new();
        for (name, value) in iter {
            outputs.insert(name, value);
        }
        outputs
    }
}

impl Serialize for DeploymentOutputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DeploymentOutputs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `Map` keeps document order
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(name, value)| {
                serde_json::from_value(value)
                    .map(|value| (name, value))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// Terminal view of a deployment after the provider call returns
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderDeployment {
    pub name: String,
    pub state: DeploymentState,
    pub outputs: DeploymentOutputs,
    pub error: Option<ProviderDiagnostic>,
}

/// What a deployment operation did to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Create,
    Read,
    Action,
    Other,
}

impl OperationKind {
    pub fn from_provider(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "create" => OperationKind::Create,
            "read" => OperationKind::Read,
            "action" => OperationKind::Action,
            _ => OperationKind::Other,
        }
    }
}

/// One operation recorded for a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOperation {
    pub resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub kind: OperationKind,
    pub state: DeploymentState,
}

impl DeploymentOperation {
    /// Nested deployments carry their own operations
    pub fn is_nested_deployment(&self) -> bool {
        self.resource_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("Microsoft.Resources/deployments"))
    }

    /// Name of the nested deployment (last id segment)
    pub fn nested_deployment_name(&self) -> Option<&str> {
        if !self.is_nested_deployment() {
            return None;
        }
        self.resource_id
            .as_deref()
            .and_then(|id| id.rsplit('/').next())
            .filter(|n| !n.is_empty())
    }
}

/// Result of deleting one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStatus {
    Deleted,
    /// Resource did not exist; treated as success
    AlreadyAbsent,
}

/// Abstract deployment provider
///
/// Implementations:
/// - `LocalProvider` - file-backed simulated provider
/// - `AzCliProvider` - shells out to the `az` CLI
/// - scripted fakes in tests
pub trait DeploymentProvider {
    /// Identity the provider runs as
    fn context(&self) -> ProviderResult<ProviderContext>;

    /// Validate a deployment without creating anything
    fn validate(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ValidationReport>;

    /// Create a deployment and block until it reaches a terminal state
    fn create_deployment(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ProviderDeployment>;

    /// Operations recorded for a deployment
    fn list_operations(
        &self,
        scope: &TargetScope,
        deployment_name: &str,
    ) -> ProviderResult<Vec<DeploymentOperation>>;

    /// Delete a resource by id
    fn delete_resource(
        &self,
        scope: &TargetScope,
        resource_id: &str,
    ) -> ProviderResult<DeletionStatus>;
}

macro_rules! forward_provider {
    ($ty:ty) => {
        impl<T: DeploymentProvider + ?Sized> DeploymentProvider for $ty {
            fn context(&self) -> ProviderResult<ProviderContext> {
                (**self).context()
            }

            fn validate(
                &self,
                scope: &TargetScope,
                submission: &DeploymentSubmission,
            ) -> ProviderResult<ValidationReport> {
                (**self).validate(scope, submission)
            }

            fn create_deployment(
                &self,
                scope: &TargetScope,
                submission: &DeploymentSubmission,
            ) -> ProviderResult<ProviderDeployment> {
                (**self).create_deployment(scope, submission)
            }

            fn list_operations(
                &self,
                scope: &TargetScope,
                deployment_name: &str,
            ) -> ProviderResult<Vec<DeploymentOperation>> {
                (**self).list_operations(scope, deployment_name)
            }

            fn delete_resource(
                &self,
                scope: &TargetScope,
                resource_id: &str,
            ) -> ProviderResult<DeletionStatus> {
                (**self).delete_resource(scope, resource_id)
            }
        }
    };
}

forward_provider!(Arc<T>);
forward_provider!(&T);
