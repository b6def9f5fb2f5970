//! Removal entities

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::value_objects::TargetScope;

/// Request to tear down what a deployment created
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalRequest {
    pub deployment_name: String,
    pub template_file: PathBuf,
    pub scope: TargetScope,
}

impl RemovalRequest {
    pub fn new(
        deployment_name: impl Into<String>,
        template_file: impl Into<PathBuf>,
        scope: TargetScope,
    ) -> Self {
        Self {
            deployment_name: deployment_name.into(),
            template_file: template_file.into(),
            scope,
        }
    }
}

/// Non-fatal failure to delete one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRemovalWarning {
    pub resource_id: String,
    pub message: String,
}

impl std::fmt::Display for ResourceRemovalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not remove {}: {}", self.resource_id, self.message)
    }
}

/// Outcome of a removal run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    pub deployment_name: String,
    /// Resources deleted by this run
    pub removed: Vec<String>,
    /// Resources that were already gone
    pub already_absent: Vec<String>,
    pub warnings: Vec<ResourceRemovalWarning>,
}

impl RemovalReport {
    pub fn new(deployment_name: impl Into<String>) -> Self {
        Self {
            deployment_name: deployment_name.into(),
            ..Self::default()
        }
    }

    /// Every targeted resource is gone
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}
