//! Deployment Removal Use Case
//!
//! Deletes what a deployment created, as recorded in its operation log.
//! Nested deployments are followed. Resources already gone count as
//! removed; any other deletion failure becomes a warning and the remaining
//! deletions continue.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::{RemovalReport, RemovalRequest, ResourceRemovalWarning};
use crate::domain::ports::{
    DeletionStatus, DeployEvent, DeployEventSink, DeploymentOperation, DeploymentProvider,
    NoopEventSink, ProviderError,
};
use crate::domain::services::plan_removal;
use crate::domain::value_objects::TargetScope;
use crate::error::DeployResult;

/// Nested deployments deeper than this are not followed
const MAX_NESTING: usize = 16;

pub struct DeploymentRemover<P: DeploymentProvider> {
    provider: P,
    events: Arc<dyn DeployEventSink>,
}

impl<P: DeploymentProvider> DeploymentRemover<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Remove every resource the deployment created
    ///
    /// Fails only when the deployment's own operations cannot be listed.
    pub fn remove(&self, request: &RemovalRequest) -> DeployResult<RemovalReport> {
        let mut operations = self
            .provider
            .list_operations(&request.scope, &request.deployment_name)?;

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(request.deployment_name.to_ascii_lowercase());
        let nested = self.nested_operations(&request.scope, &operations, &mut visited, 1);
        operations.extend(nested);

        let ids = plan_removal(&operations);
        info!(
            deployment = %request.deployment_name,
            resources = ids.len(),
            "removing deployed resources"
        );
        self.events.on_event(DeployEvent::RemovalStarted {
            name: request.deployment_name.clone(),
            resources: ids.len(),
        });

        let mut report = RemovalReport::new(&request.deployment_name);
        for id in ids {
            match self.provider.delete_resource(&request.scope, &id) {
                Ok(DeletionStatus::Deleted) => {
                    debug!(resource = %id, "removed");
                    self.events.on_event(DeployEvent::ResourceRemoved {
                        resource_id: id.clone(),
                    });
                    report.removed.push(id);
                }
                Ok(DeletionStatus::AlreadyAbsent) => {
                    debug!(resource = %id, "already absent");
                    self.events.on_event(DeployEvent::ResourceAbsent {
                        resource_id: id.clone(),
                    });
                    report.already_absent.push(id);
                }
                Err(e) => {
                    warn!(resource = %id, error = %e, "could not remove resource");
                    self.events.on_event(DeployEvent::RemovalWarning {
                        resource_id: id.clone(),
                        message: e.to_string(),
                    });
                    report.warnings.push(ResourceRemovalWarning {
                        resource_id: id,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Operations of nested deployments, depth first
    fn nested_operations(
        &self,
        scope: &TargetScope,
        operations: &[DeploymentOperation],
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Vec<DeploymentOperation> {
        if depth > MAX_NESTING {
            warn!(depth, "nested deployments too deep, not following further");
            return Vec::new();
        }

        let mut collected = Vec::new();
        for name in operations.iter().filter_map(|op| op.nested_deployment_name()) {
            if !visited.insert(name.to_ascii_lowercase()) {
                continue;
            }
            match self.provider.list_operations(scope, name) {
                Ok(inner) => {
                    let deeper = self.nested_operations(scope, &inner, visited, depth + 1);
                    collected.extend(inner);
                    collected.extend(deeper);
                }
                Err(ProviderError::DeploymentNotFound(_)) => {
                    debug!(deployment = %name, "nested deployment not found");
                }
                Err(e) => {
                    warn!(deployment = %name, error = %e, "could not list nested deployment");
                }
            }
        }
        collected
    }
}
