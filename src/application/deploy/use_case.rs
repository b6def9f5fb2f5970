//! Deployment Executor
//!
//! Orchestrates one deployment:
//! 1. Read the template and inject parameter defaults
//! 2. Pick a deployment name (explicit, or generated per attempt)
//! 3. Create the deployment and wait for a terminal state
//! 4. Retry `Failed` outcomes up to the retry limit; a create call that errors
//!    out is a `Failed` outcome under the submitted name and is not retried
//! 5. Unwrap outputs from their `{type, value}` wrappers
//!
//! A failed deployment is a value, not an error. `execute_strict` turns it
//! into `DeployError::Deployment` for callers that want that.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::application::submission::PreparedDeployment;
use crate::domain::entities::{
    DeploymentFailure, DeploymentOutcome, DeploymentRequest, DeploymentResult, DeploymentState,
};
use crate::domain::ports::{
    DeployEvent, DeployEventSink, DeploymentOutputs, DeploymentProvider, NoopEventSink,
    ProviderDeployment, ProviderError,
};
use crate::domain::value_objects::{deployment_name, ProviderDiagnostic};
use crate::error::DeployResult;

use super::options::DeployOptions;

/// Deployment executor - creates a deployment and reports its outcome
///
/// Parameterized by the provider port so tests can script outcomes.
pub struct DeploymentExecutor<P: DeploymentProvider> {
    provider: P,
    options: DeployOptions,
    events: Arc<dyn DeployEventSink>,
}

impl<P: DeploymentProvider> DeploymentExecutor<P> {
    pub fn new(provider: P, options: DeployOptions) -> Self {
        Self {
            provider,
            options,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Deploy and return the typed result; a failed deployment is not an error
    pub fn execute(&self, request: &DeploymentRequest) -> DeployResult<DeploymentResult> {
        let prepared = PreparedDeployment::prepare(request, &self.options.defaults)?;
        let limit = self.options.retry_limit.max(1);

        let mut previous_name: Option<String> = None;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let name = self.attempt_name(request, previous_name.as_deref(), attempt);
            let submission = prepared.submission(request, &name);

            info!(deployment = %name, scope = %request.scope, attempt, "creating deployment");
            self.events.on_event(DeployEvent::DeploymentStarted {
                name: name.clone(),
                attempt,
            });

            let (deployment, retryable) =
                match self.provider.create_deployment(&request.scope, &submission) {
                    Ok(deployment) => (deployment, true),
                    Err(e) => {
                        warn!(deployment = %name, error = %e, "deployment request failed");
                        (request_failed(&name, &e), false)
                    }
                };
            self.events.on_event(DeployEvent::DeploymentFinished {
                name: deployment.name.clone(),
                state: deployment.state,
                error: deployment.error.as_ref().map(ToString::to_string),
            });

            let retry = retryable && deployment.state == DeploymentState::Failed && attempt < limit;
            if retry {
                warn!(
                    deployment = %deployment.name,
                    attempt,
                    limit,
                    "deployment failed, retrying"
                );
                previous_name = Some(name);
                continue;
            }

            return Ok(into_result(request, deployment, attempt));
        }
    }

    /// Deploy and fail with `DeployError::Deployment` unless it succeeded
    pub fn execute_strict(&self, request: &DeploymentRequest) -> DeployResult<DeploymentResult> {
        self.execute(request)?.into_result()
    }

    /// Explicit names are reused on every attempt; generated names are fresh
    fn attempt_name(&self, request: &DeploymentRequest, previous: Option<&str>, attempt: u32) -> String {
        if let Some(name) = request.deployment_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let now = Utc::now();
        let name = deployment_name::generate(&request.template_file, now);
        if previous == Some(name.as_str()) {
            // Same clock tick as the previous attempt
            return deployment_name::generate(
                &request.template_file,
                now + Duration::milliseconds(i64::from(attempt)),
            );
        }
        name
    }
}

/// The create call itself failed; resources may still exist under `name`
fn request_failed(name: &str, error: &ProviderError) -> ProviderDeployment {
    ProviderDeployment {
        name: name.to_string(),
        state: DeploymentState::Failed,
        outputs: DeploymentOutputs::new(),
        error: Some(ProviderDiagnostic::new("DeploymentRequestFailed", error.to_string())),
    }
}

fn into_result(
    request: &DeploymentRequest,
    deployment: ProviderDeployment,
    attempts: u32,
) -> DeploymentResult {
    let outcome = if deployment.state.is_success() {
        DeploymentOutcome::Succeeded {
            outputs: deployment.outputs.into_values(),
        }
    } else {
        // Non-terminal states never come back from a blocking create; count
        // them as failed.
        let state = if deployment.state.is_terminal() {
            deployment.state
        } else {
            DeploymentState::Failed
        };
        DeploymentOutcome::Failed(DeploymentFailure {
            state,
            diagnostic: deployment.error,
        })
    };

    DeploymentResult {
        deployment_name: deployment.name,
        scope: request.scope.clone(),
        outcome,
        attempts,
    }
}
