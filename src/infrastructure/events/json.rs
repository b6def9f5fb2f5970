//! JSON Event Sink
//!
//! Outputs pipeline events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events
pub struct JsonEventSink {
    command: &'static str,
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            command,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        let command = self.command;
        let json = match event {
            DeployEvent::Started {
                command,
                template,
                scope,
            } => json!({
                "event": "start",
                "command": command,
                "version": env!("CARGO_PKG_VERSION"),
                "template": template.display().to_string(),
                "scope": scope,
            }),

            DeployEvent::TokensReplaced {
                path,
                replaced,
                unresolved,
            } => json!({
                "event": "tokens_replaced",
                "command": command,
                "path": path.display().to_string(),
                "replaced": replaced,
                "unresolved": unresolved,
            }),

            DeployEvent::Validated { template } => json!({
                "event": "validated",
                "command": command,
                "template": template.display().to_string(),
            }),

            DeployEvent::DeploymentStarted { name, attempt } => json!({
                "event": "deployment_started",
                "command": command,
                "name": name,
                "attempt": attempt,
            }),

            DeployEvent::DeploymentFinished { name, state, error } => json!({
                "event": "deployment_finished",
                "command": command,
                "name": name,
                "state": state.to_string(),
                "error": error,
            }),

            DeployEvent::OutputPublished { name, value } => json!({
                "event": "output",
                "command": command,
                "name": name,
                "value": value,
            }),

            DeployEvent::RemovalStarted { name, resources } => json!({
                "event": "removal_started",
                "command": command,
                "name": name,
                "resources": resources,
            }),

            DeployEvent::ResourceRemoved { resource_id } => json!({
                "event": "resource_removed",
                "command": command,
                "resource_id": resource_id,
            }),

            DeployEvent::ResourceAbsent { resource_id } => json!({
                "event": "resource_absent",
                "command": command,
                "resource_id": resource_id,
            }),

            DeployEvent::RemovalWarning {
                resource_id,
                message,
            } => json!({
                "event": "removal_warning",
                "command": command,
                "resource_id": resource_id,
                "message": message,
            }),

            DeployEvent::Completed {
                command,
                success,
                deployment_name,
                outputs,
                warnings,
            } => json!({
                "event": "complete",
                "command": command,
                "success": success,
                "deployment_name": deployment_name,
                "deploymentOutput": outputs,
                "warnings": warnings,
            }),
        };

        self.write_event(json);
    }

    fn wants_detailed_events(&self) -> bool {
        true // JSON mode wants all events
    }
}
