//! Deploy Event Port
//!
//! Provides an observable interface for pipeline runs.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use serde_json::Value;

use crate::domain::entities::DeploymentState;

/// Event emitted while running the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Run started
    Started {
        command: &'static str,
        template: PathBuf,
        scope: String,
    },

    /// Parameter file tokens were substituted
    TokensReplaced {
        path: PathBuf,
        replaced: usize,
        unresolved: Vec<String>,
    },

    /// Template passed validation
    Validated { template: PathBuf },

    /// Deployment submitted to the provider
    DeploymentStarted { name: String, attempt: u32 },

    /// Provider reported a terminal state
    DeploymentFinished {
        name: String,
        state: DeploymentState,
        error: Option<String>,
    },

    /// One deployment output
    OutputPublished { name: String, value: Value },

    /// Removal started
    RemovalStarted { name: String, resources: usize },

    /// Resource deleted
    ResourceRemoved { resource_id: String },

    /// Resource was already gone
    ResourceAbsent { resource_id: String },

    /// Resource could not be deleted (non-fatal)
    RemovalWarning { resource_id: String, message: String },

    /// Run completed
    Completed {
        command: &'static str,
        success: bool,
        deployment_name: Option<String>,
        outputs: Value,
        warnings: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress display in terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants detailed events (e.g., per-resource)
    ///
    /// Some sinks (like CI) may only want summary events.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {
        // Do nothing
    }

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
