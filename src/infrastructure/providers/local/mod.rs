//! File-backed simulated provider
//!
//! Interprets ARM JSON templates against a state directory instead of a
//! cloud. Used for offline runs and integration tests; it applies the same
//! parameter checks a real provider would and records every created
//! resource so removal can be observed.

mod arm;
mod state;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::entities::DeploymentState;
use crate::domain::ports::{
    DeletionStatus, DeploymentOperation, DeploymentProvider, DeploymentSubmission,
    ProviderContext, ProviderDeployment, ProviderError, ProviderResult, ValidationReport,
};
use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};

use arm::Binding;
use state::{deployment_key, StateStore};

pub use state::{DeploymentRecord, LocalState};

/// Subscription the local provider pretends to operate in
pub const LOCAL_SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";
/// Tenant the local provider pretends to operate in
pub const LOCAL_TENANT_ID: &str = "00000000-0000-0000-0000-00000000000a";

/// Default state directory, relative to the working directory
pub const DEFAULT_STATE_DIR: &str = ".iacdeploy";

#[derive(Debug, Clone)]
pub struct LocalProvider {
    store: StateStore,
}

impl LocalProvider {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StateStore::new(state_dir),
        }
    }

    pub fn state_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Snapshot of the persisted state
    pub fn snapshot(&self) -> ProviderResult<LocalState> {
        self.store.read(|s| Ok(s.clone()))
    }

    /// Ids of all resources currently present
    pub fn resources(&self) -> ProviderResult<Vec<String>> {
        self.store
            .read(|s| Ok(s.resources.values().cloned().collect()))
    }
}

fn scope_prefix(scope: &TargetScope) -> String {
    match scope {
        TargetScope::ResourceGroup {
            name,
            subscription_id,
        } => format!(
            "/subscriptions/{}/resourceGroups/{}",
            subscription_id.as_deref().unwrap_or(LOCAL_SUBSCRIPTION_ID),
            name
        ),
        TargetScope::ManagementGroup { id } => {
            format!("/providers/Microsoft.Management/managementGroups/{}", id)
        }
        TargetScope::Subscription { id } => format!(
            "/subscriptions/{}",
            id.as_deref().unwrap_or(LOCAL_SUBSCRIPTION_ID)
        ),
    }
}

fn location_error(scope: &TargetScope, submission: &DeploymentSubmission) -> Option<ProviderDiagnostic> {
    (scope.requires_location() && submission.location.trim().is_empty()).then(|| {
        ProviderDiagnostic::new(
            "InvalidDeploymentLocation",
            format!("A location is required for {} scope deployments.", scope.kind()),
        )
    })
}

fn failed(submission: &DeploymentSubmission, diagnostic: ProviderDiagnostic) -> ProviderDeployment {
    ProviderDeployment {
        name: submission.name.clone(),
        state: DeploymentState::Failed,
        outputs: Default::default(),
        error: Some(diagnostic),
    }
}

impl DeploymentProvider for LocalProvider {
    fn context(&self) -> ProviderResult<ProviderContext> {
        Ok(ProviderContext {
            tenant_id: Some(LOCAL_TENANT_ID.to_string()),
            subscription_id: Some(LOCAL_SUBSCRIPTION_ID.to_string()),
        })
    }

    fn validate(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ValidationReport> {
        if let Some(diagnostic) = location_error(scope, submission) {
            return Ok(ValidationReport::invalid(diagnostic));
        }
        match arm::bind(submission)? {
            Binding::Bound(_) => Ok(ValidationReport::valid()),
            Binding::Rejected(diagnostic) => Ok(ValidationReport::invalid(diagnostic)),
        }
    }

    fn create_deployment(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ProviderDeployment> {
        if let Some(diagnostic) = location_error(scope, submission) {
            return Ok(failed(submission, diagnostic));
        }
        let bound = match arm::bind(submission)? {
            Binding::Bound(bound) => bound,
            Binding::Rejected(diagnostic) => return Ok(failed(submission, diagnostic)),
        };

        let prefix = scope_prefix(scope);
        let evaluation = arm::evaluate(&bound, &prefix);
        debug!(
            deployment = %submission.name,
            operations = evaluation.operations.len(),
            state = %evaluation.state,
            "local deployment evaluated"
        );

        self.store.update(|state| {
            state.record(&prefix, &submission.name, scope, &evaluation, bound.hash());
            Ok(())
        })?;

        Ok(ProviderDeployment {
            name: submission.name.clone(),
            state: evaluation.state,
            outputs: evaluation.outputs,
            error: evaluation.error,
        })
    }

    fn list_operations(
        &self,
        scope: &TargetScope,
        deployment_name: &str,
    ) -> ProviderResult<Vec<DeploymentOperation>> {
        let key = deployment_key(&scope_prefix(scope), deployment_name);
        self.store.read(|state| {
            state
                .deployments
                .get(&key)
                .map(|record| record.operations.clone())
                .ok_or_else(|| ProviderError::DeploymentNotFound(deployment_name.to_string()))
        })
    }

    fn delete_resource(
        &self,
        _scope: &TargetScope,
        resource_id: &str,
    ) -> ProviderResult<DeletionStatus> {
        self.store.update(|state| Ok(state.delete(resource_id)))
    }
}
