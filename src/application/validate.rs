//! Template Validation Use Case
//!
//! Resolves the scope, injects parameter defaults and asks the provider to
//! validate. Exactly one provider call is made; nothing is deployed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::entities::{DeploymentRequest, ParameterOverrides, TemplateInfo};
use crate::domain::ports::{DeployEvent, DeployEventSink, DeploymentProvider, NoopEventSink};
use crate::domain::value_objects::{deployment_name, TargetScope};
use crate::error::{DeployError, DeployResult};

use super::submission::PreparedDeployment;

/// A template the provider accepted
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub scope: TargetScope,
    pub template: TemplateInfo,
    /// Parameters sent next to the parameter file
    pub parameters: ParameterOverrides,
    /// Parameters that came from project defaults
    pub injected: Vec<String>,
}

pub struct TemplateValidator<P: DeploymentProvider> {
    provider: P,
    defaults: ParameterOverrides,
    events: Arc<dyn DeployEventSink>,
}

impl<P: DeploymentProvider> TemplateValidator<P> {
    pub fn new(provider: P, defaults: ParameterOverrides) -> Self {
        Self {
            provider,
            defaults,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn validate(&self, request: &DeploymentRequest) -> DeployResult<ValidationOutcome> {
        let prepared = PreparedDeployment::prepare(request, &self.defaults)?;
        if !prepared.parameters.injected.is_empty() {
            debug!(injected = ?prepared.parameters.injected, "parameter defaults injected");
        }

        let name = request
            .deployment_name
            .clone()
            .unwrap_or_else(|| deployment_name::generate(&request.template_file, Utc::now()));
        let submission = prepared.submission(request, &name);

        let report = self.provider.validate(&request.scope, &submission)?;
        if let Some(diagnostic) = report.error {
            return Err(DeployError::TemplateValidation {
                template: request.template_file.clone(),
                diagnostic,
            });
        }

        info!(template = %request.template_file.display(), scope = %request.scope, "template valid");
        self.events.on_event(DeployEvent::Validated {
            template: request.template_file.clone(),
        });

        Ok(ValidationOutcome {
            scope: request.scope.clone(),
            template: prepared.template,
            parameters: prepared.parameters.parameters,
            injected: prepared.parameters.injected,
        })
    }
}
