//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod deployment_provider;
pub mod file_system;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use deployment_provider::{
    DeletionStatus, DeploymentOperation, DeploymentOutputs, DeploymentProvider,
    DeploymentSubmission, OperationKind, OutputValue, ProviderContext, ProviderDeployment,
    ProviderError, ProviderResult, ValidationReport,
};
pub use file_system::{FileSystem, FsError, FsResult};
