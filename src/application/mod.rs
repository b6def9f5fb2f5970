//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `TokenReplacer` - Substitutes placeholders in a parameter file
//! - `TemplateValidator` - Asks the provider to validate a template
//! - `DeploymentExecutor` - Creates a deployment and types its outcome
//! - `DeploymentRemover` - Deletes what a deployment created
//! - `Orchestrator` - Runs all of the above in order

pub mod deploy;
pub mod pipeline;
pub mod remove;
mod submission;
pub mod tokens;
pub mod validate;

#[cfg(test)]
mod testing;

pub use deploy::{DeployOptions, DeploymentExecutor};
pub use pipeline::{Orchestrator, PipelineContext, PipelineOptions, PipelineReport};
pub use remove::DeploymentRemover;
pub use tokens::{
    build_token_map, ReplaceOptions, RunContext, TokenReplaceOutcome, TokenReplacer,
    BUILT_IN_TOKENS,
};
pub use validate::{TemplateValidator, ValidationOutcome};
