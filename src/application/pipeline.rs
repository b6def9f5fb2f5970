//! Deployment pipeline
//!
//! One end-to-end run against a single template:
//!
//! 1. Replace tokens in the parameter file
//! 2. Validate the template at the resolved scope
//! 3. Deploy (typed result, failure is data)
//! 4. Publish outputs
//! 5. Remove what the deployment created, when enabled, even after a failure
//! 6. Raise the deployment failure, if any, after cleanup
//!
//! Removal problems are collected as warnings and never change the outcome.
//! `execute` stops after step 5 and keeps a failed deployment in the report;
//! `run` adds step 6.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::entities::{
    DeploymentRequest, DeploymentResult, Outputs, ParameterOverrides, RemovalReport,
    RemovalRequest,
};
use crate::domain::ports::{
    DeployEvent, DeployEventSink, DeploymentProvider, FileSystem, NoopEventSink,
};
use crate::domain::value_objects::{deployment_name, ScopeSelector, TargetScope};
use crate::error::DeployResult;

use super::deploy::{DeployOptions, DeploymentExecutor};
use super::remove::DeploymentRemover;
use super::tokens::{build_token_map, ReplaceOptions, RunContext, TokenReplaceOutcome, TokenReplacer};
use super::validate::TemplateValidator;

/// Inputs of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub template_file: PathBuf,
    pub parameter_file: PathBuf,
    pub location: String,
    pub selector: ScopeSelector,
    /// Caller-supplied tokens; win over local and built-in tokens
    pub custom_tokens: Vec<(String, String)>,
    /// Tear the deployment down after it ran
    pub remove_deployment: bool,
    pub deployment_name: Option<String>,
    pub tenant_id: Option<String>,
    pub principal_id: Option<String>,
    pub strict_tokens: bool,
    pub overrides: ParameterOverrides,
}

impl PipelineOptions {
    pub fn new(
        template_file: impl Into<PathBuf>,
        parameter_file: impl Into<PathBuf>,
        location: impl Into<String>,
        selector: ScopeSelector,
    ) -> Self {
        Self {
            template_file: template_file.into(),
            parameter_file: parameter_file.into(),
            location: location.into(),
            selector,
            custom_tokens: Vec::new(),
            remove_deployment: true,
            deployment_name: None,
            tenant_id: None,
            principal_id: None,
            strict_tokens: false,
            overrides: ParameterOverrides::new(),
        }
    }

    pub fn with_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_tokens.push((name.into(), value.into()));
        self
    }

    pub fn with_removal(mut self, remove: bool) -> Self {
        self.remove_deployment = remove;
        self
    }

    pub fn with_deployment_name(mut self, name: impl Into<String>) -> Self {
        self.deployment_name = Some(name.into());
        self
    }

    pub fn with_strict_tokens(mut self, strict: bool) -> Self {
        self.strict_tokens = strict;
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_principal(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(name.into(), value);
        self
    }

    fn explicit_name(&self) -> Option<&str> {
        self.deployment_name.as_deref().filter(|n| !n.trim().is_empty())
    }

    fn request(&self, scope: TargetScope) -> DeploymentRequest {
        let request = DeploymentRequest::new(&self.template_file, scope)
            .with_parameter_file(&self.parameter_file)
            .with_location(&self.location)
            .with_overrides(self.overrides.clone());
        match self.explicit_name() {
            Some(name) => request.with_deployment_name(name),
            None => request,
        }
    }
}

/// Values later steps of a run can read
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    pub scope: TargetScope,
    pub deployment_name: String,
    pub outputs: Outputs,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub context: PipelineContext,
    pub tokens: TokenReplaceOutcome,
    pub deployment: DeploymentResult,
    pub removal: Option<RemovalReport>,
    pub warnings: Vec<String>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.deployment.succeeded()
    }

    /// Raise a failed deployment as `DeployError::Deployment`
    pub fn into_result(self) -> DeployResult<Self> {
        self.deployment.clone().into_result().map(|_| self)
    }
}

/// Runs tokens, validation, deployment and removal in order
pub struct Orchestrator<FS: FileSystem, P: DeploymentProvider> {
    fs: FS,
    provider: P,
    settings: Settings,
    command: &'static str,
    events: Arc<dyn DeployEventSink>,
}

impl<FS: FileSystem, P: DeploymentProvider> Orchestrator<FS, P> {
    pub fn new(fs: FS, provider: P, settings: Settings) -> Self {
        Self {
            fs,
            provider,
            settings,
            command: "run",
            events: Arc::new(NoopEventSink),
        }
    }

    /// Name reported in the start and completion events
    pub fn with_command(mut self, command: &'static str) -> Self {
        self.command = command;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Run every stage and raise a failed deployment after cleanup
    pub fn run(&self, options: &PipelineOptions) -> DeployResult<PipelineReport> {
        self.execute(options)?.into_result()
    }

    /// Run every stage; a failed deployment is returned in the report
    pub fn execute(&self, options: &PipelineOptions) -> DeployResult<PipelineReport> {
        if let Some(name) = options.explicit_name() {
            deployment_name::check(name)?;
        }
        let mut warnings = Vec::new();

        let scope = options.selector.resolve();
        if options.selector.is_ambiguous() {
            let message = format!("several scope identifiers given, deploying at {scope}");
            warn!("{message}");
            warnings.push(message);
        }
        self.events.on_event(DeployEvent::Started {
            command: self.command,
            template: options.template_file.clone(),
            scope: scope.to_string(),
        });

        let tokens = self.replace_tokens(options)?;
        if !tokens.replacement.unresolved.is_empty() {
            warnings.push(format!(
                "unresolved tokens left in {}: {}",
                tokens.path.display(),
                tokens.replacement.unresolved.join(", ")
            ));
        }

        let request = options.request(scope.clone());
        TemplateValidator::new(&self.provider, self.settings.default_parameters())
            .with_event_sink(self.events.clone())
            .validate(&request)?;

        let deployment =
            DeploymentExecutor::new(&self.provider, DeployOptions::from_settings(&self.settings))
                .with_event_sink(self.events.clone())
                .execute(&request)?;

        let outputs = deployment.outputs().cloned().unwrap_or_default();
        for (name, value) in &outputs {
            self.events.on_event(DeployEvent::OutputPublished {
                name: name.clone(),
                value: value.clone(),
            });
        }

        let removal = if !options.remove_deployment {
            debug!("removal disabled");
            None
        } else if deployment.deployment_name.is_empty() {
            debug!("no deployment name, nothing to remove");
            None
        } else {
            self.remove(&deployment.deployment_name, options, &scope, &mut warnings)
        };

        self.events.on_event(DeployEvent::Completed {
            command: self.command,
            success: deployment.succeeded(),
            deployment_name: Some(deployment.deployment_name.clone()),
            outputs: deployment.output_json(),
            warnings: warnings.len(),
        });

        info!(
            deployment = %deployment.deployment_name,
            succeeded = deployment.succeeded(),
            "pipeline finished"
        );

        Ok(PipelineReport {
            context: PipelineContext {
                scope,
                deployment_name: deployment.deployment_name.clone(),
                outputs,
            },
            tokens,
            deployment,
            removal,
            warnings,
        })
    }

    fn replace_tokens(&self, options: &PipelineOptions) -> DeployResult<TokenReplaceOutcome> {
        let mut context = RunContext::from_selector(&options.selector)
            .with_tenant(options.tenant_id.as_deref())
            .with_principal(options.principal_id.as_deref());
        match self.provider.context() {
            Ok(identity) => context = context.fill_from(&identity),
            Err(e) => debug!(error = %e, "provider identity unavailable"),
        }

        let map = build_token_map(&context, &self.settings, &options.custom_tokens);
        let outcome = TokenReplacer::new(&self.fs).replace(
            &options.parameter_file,
            &map,
            &self.settings.delimiters(),
            ReplaceOptions {
                strict: options.strict_tokens,
                dry_run: false,
            },
        )?;

        self.events.on_event(DeployEvent::TokensReplaced {
            path: outcome.path.clone(),
            replaced: outcome.replacement.total_replaced(),
            unresolved: outcome.replacement.unresolved.clone(),
        });
        Ok(outcome)
    }

    fn remove(
        &self,
        deployment_name: &str,
        options: &PipelineOptions,
        scope: &TargetScope,
        warnings: &mut Vec<String>,
    ) -> Option<RemovalReport> {
        let request = RemovalRequest::new(deployment_name, &options.template_file, scope.clone());
        match DeploymentRemover::new(&self.provider)
            .with_event_sink(self.events.clone())
            .remove(&request)
        {
            Ok(report) => {
                warnings.extend(report.warnings.iter().map(ToString::to_string));
                Some(report)
            }
            Err(e) => {
                warn!(deployment = %deployment_name, error = %e, "removal skipped");
                warnings.push(format!("could not remove deployment {deployment_name}: {e}"));
                None
            }
        }
    }
}
