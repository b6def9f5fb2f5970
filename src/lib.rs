//! iacdeploy - validate, deploy and tear down infrastructure-as-code templates
//!
//! A run substitutes tokens in a parameter file, validates the template at
//! the resolved scope, deploys it, publishes its outputs and optionally
//! removes everything the deployment created.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    DeploymentExecutor, DeploymentRemover, Orchestrator, PipelineOptions, PipelineReport,
    TemplateValidator, TokenReplacer,
};
pub use config::Settings;
pub use domain::entities::{DeploymentRequest, DeploymentResult, DeploymentState, RemovalReport};
pub use domain::value_objects::{ScopeSelector, TargetScope};
pub use error::{DeployError, DeployResult};
