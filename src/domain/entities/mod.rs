//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `DeploymentRequest` / `DeploymentResult` - one deployment attempt
//! - `RemovalRequest` / `RemovalReport` - teardown of a deployment
//! - `TemplateInfo` - what a template declares

mod deployment;
mod removal;
mod template;

pub use deployment::{
    DeploymentFailure, DeploymentOutcome, DeploymentRequest, DeploymentResult, DeploymentState,
    Outputs, ParameterOverrides,
};
pub use removal::{RemovalReport, RemovalRequest, ResourceRemovalWarning};
pub use template::{strip_json_comments, TemplateFormat, TemplateInfo, TemplateParameter};
