//! Scripted provider shared by the use case tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::domain::entities::DeploymentState;
use crate::domain::ports::{
    DeletionStatus, DeploymentOperation, DeploymentOutputs, DeploymentProvider,
    DeploymentSubmission, OperationKind, OutputValue, ProviderContext, ProviderDeployment,
    ProviderError, ProviderResult, ValidationReport,
};
use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};

type Call = (TargetScope, DeploymentSubmission);

#[derive(Default)]
pub struct FakeProvider {
    validation_error: Option<ProviderDiagnostic>,
    script: RefCell<VecDeque<(DeploymentState, Value, Option<ProviderDiagnostic>)>>,
    operations: HashMap<String, Vec<DeploymentOperation>>,
    create_fails: bool,
    unnamed: bool,
    listing_fails: bool,
    absent: HashSet<String>,
    failing_deletes: HashSet<String>,
    validations: RefCell<Vec<Call>>,
    deployments: RefCell<Vec<Call>>,
    listed: RefCell<Vec<String>>,
    deleted: RefCell<Vec<String>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, diagnostic: ProviderDiagnostic) -> Self {
        self.validation_error = Some(diagnostic);
        self
    }

    /// Next deployment succeeds with these outputs (`{name: value}`)
    pub fn then_succeed(self, outputs: Value) -> Self {
        self.script
            .borrow_mut()
            .push_back((DeploymentState::Succeeded, outputs, None));
        self
    }

    /// Next deployment ends in `state`
    pub fn then_end(self, state: DeploymentState, diagnostic: ProviderDiagnostic) -> Self {
        self.script
            .borrow_mut()
            .push_back((state, Value::Null, Some(diagnostic)));
        self
    }

    /// Every create call fails outright, as a broken `az` invocation does
    pub fn with_failing_create(mut self) -> Self {
        self.create_fails = true;
        self
    }

    /// Deployments come back without a name
    pub fn with_unnamed_deployments(mut self) -> Self {
        self.unnamed = true;
        self
    }

    pub fn with_operations(mut self, deployment: &str, ops: Vec<DeploymentOperation>) -> Self {
        self.operations.insert(deployment.to_string(), ops);
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.listing_fails = true;
        self
    }

    pub fn with_absent(mut self, id: &str) -> Self {
        self.absent.insert(id.to_string());
        self
    }

    pub fn with_failing_delete(mut self, id: &str) -> Self {
        self.failing_deletes.insert(id.to_string());
        self
    }

    pub fn validations(&self) -> Vec<Call> {
        self.validations.borrow().clone()
    }

    pub fn deployments(&self) -> Vec<Call> {
        self.deployments.borrow().clone()
    }

    pub fn listed(&self) -> Vec<String> {
        self.listed.borrow().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.borrow().clone()
    }
}

impl DeploymentProvider for FakeProvider {
    fn context(&self) -> ProviderResult<ProviderContext> {
        Ok(ProviderContext {
            tenant_id: Some("fake-tenant".to_string()),
            subscription_id: Some("fake-subscription".to_string()),
        })
    }

    fn validate(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ValidationReport> {
        self.validations
            .borrow_mut()
            .push((scope.clone(), submission.clone()));
        Ok(match &self.validation_error {
            Some(d) => ValidationReport::invalid(d.clone()),
            None => ValidationReport::valid(),
        })
    }

    fn create_deployment(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ProviderDeployment> {
        self.deployments
            .borrow_mut()
            .push((scope.clone(), submission.clone()));
        if self.create_fails {
            return Err(ProviderError::CommandFailed {
                command: "az deployment group create".to_string(),
                stderr: "connection reset by peer".to_string(),
            });
        }

        let (state, outputs, error) = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or((DeploymentState::Succeeded, Value::Null, None));

        let outputs: DeploymentOutputs = match outputs {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    (
                        k,
                        OutputValue {
                            value_type: "String".to_string(),
                            value: v,
                        },
                    )
                })
                .collect(),
            _ => DeploymentOutputs::new(),
        };

        Ok(ProviderDeployment {
            name: if self.unnamed {
                String::new()
            } else {
                submission.name.clone()
            },
            state,
            outputs,
            error,
        })
    }

    fn list_operations(
        &self,
        _scope: &TargetScope,
        deployment_name: &str,
    ) -> ProviderResult<Vec<DeploymentOperation>> {
        self.listed.borrow_mut().push(deployment_name.to_string());
        if self.listing_fails {
            return Err(ProviderError::CommandFailed {
                command: "list".to_string(),
                stderr: "throttled".to_string(),
            });
        }
        self.operations
            .get(deployment_name)
            .cloned()
            .ok_or_else(|| ProviderError::DeploymentNotFound(deployment_name.to_string()))
    }

    fn delete_resource(
        &self,
        _scope: &TargetScope,
        resource_id: &str,
    ) -> ProviderResult<DeletionStatus> {
        if self.failing_deletes.contains(resource_id) {
            return Err(ProviderError::CommandFailed {
                command: "delete".to_string(),
                stderr: "Conflict: resource is locked".to_string(),
            });
        }
        self.deleted.borrow_mut().push(resource_id.to_string());
        if self.absent.contains(resource_id) {
            Ok(DeletionStatus::AlreadyAbsent)
        } else {
            Ok(DeletionStatus::Deleted)
        }
    }
}

/// Successful create operation on a resource
pub fn created(id: &str, resource_type: &str) -> DeploymentOperation {
    DeploymentOperation {
        resource_id: Some(id.to_string()),
        resource_type: Some(resource_type.to_string()),
        kind: OperationKind::Create,
        state: DeploymentState::Succeeded,
    }
}

/// ARM template declaring the given parameters (all with defaults)
pub fn arm_template(dir: &TempDir, parameters: &[&str]) -> PathBuf {
    let params: serde_json::Map<String, Value> = parameters
        .iter()
        .map(|p| (p.to_string(), json!({ "type": "string", "defaultValue": "" })))
        .collect();
    let path = dir.path().join("main.json");
    std::fs::write(
        &path,
        json!({
            "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#",
            "contentVersion": "1.0.0.0",
            "parameters": params,
            "resources": []
        })
        .to_string(),
    )
    .unwrap();
    path
}
