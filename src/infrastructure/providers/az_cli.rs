//! `az` CLI provider
//!
//! Shells out to the Azure CLI for every provider call. Overrides are
//! passed through a temporary ARM parameter file layered after the user's
//! parameter file, so later values win.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::entities::{DeploymentState, ParameterOverrides};
use crate::domain::ports::{
    DeletionStatus, DeploymentOperation, DeploymentOutputs, DeploymentProvider,
    DeploymentSubmission, OperationKind, ProviderContext, ProviderDeployment, ProviderError,
    ProviderResult, ValidationReport,
};
use crate::domain::value_objects::{ProviderDiagnostic, TargetScope};

const PARAMETER_FILE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#";

/// Provider backed by the `az` command-line client
#[derive(Debug, Clone)]
pub struct AzCliProvider {
    program: String,
}

impl Default for AzCliProvider {
    fn default() -> Self {
        Self::new("az")
    }
}

struct CommandOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl AzCliProvider {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[String]) -> ProviderResult<CommandOutput> {
        debug!(program = %self.program, args = %args.join(" "), "running provider command");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProviderError::Unavailable(format!(
                    "'{}' was not found; install the Azure CLI or use the local provider",
                    self.program
                )),
                _ => ProviderError::Io(e),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn command_failed(&self, args: &[String], stderr: &str) -> ProviderError {
        ProviderError::CommandFailed {
            command: format!("{} {}", self.program, args.join(" ")),
            stderr: stderr.trim().to_string(),
        }
    }

    /// Run `deployment validate|create` with overrides written to a temp file
    fn run_deployment(
        &self,
        action: &str,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<(Vec<String>, CommandOutput)> {
        let overrides = write_override_file(&submission.parameters)?;
        let args = deployment_args(
            action,
            scope,
            submission,
            overrides.as_ref().map(|f| f.path()),
        );
        let output = self.run(&args)?;
        Ok((args, output))
    }
}

fn scope_group(scope: &TargetScope) -> &'static str {
    match scope {
        TargetScope::ResourceGroup { .. } => "group",
        TargetScope::Subscription { .. } => "sub",
        TargetScope::ManagementGroup { .. } => "mg",
    }
}

/// Arguments naming the target scope (without location)
fn scope_identity_args(scope: &TargetScope) -> Vec<String> {
    match scope {
        TargetScope::ResourceGroup {
            name,
            subscription_id,
        } => {
            let mut args = vec!["--resource-group".to_string(), name.clone()];
            if let Some(sub) = subscription_id {
                args.push("--subscription".to_string());
                args.push(sub.clone());
            }
            args
        }
        TargetScope::Subscription { id } => match id {
            Some(sub) => vec!["--subscription".to_string(), sub.clone()],
            None => Vec::new(),
        },
        TargetScope::ManagementGroup { id } => {
            vec!["--management-group-id".to_string(), id.clone()]
        }
    }
}

fn deployment_args(
    action: &str,
    scope: &TargetScope,
    submission: &DeploymentSubmission,
    override_file: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![
        "deployment".to_string(),
        scope_group(scope).to_string(),
        action.to_string(),
        "--name".to_string(),
        submission.name.clone(),
        "--template-file".to_string(),
        submission.template_file.display().to_string(),
    ];

    if let Some(parameter_file) = &submission.parameter_file {
        args.push("--parameters".to_string());
        args.push(format!("@{}", parameter_file.display()));
    }
    if let Some(path) = override_file {
        args.push("--parameters".to_string());
        args.push(format!("@{}", path.display()));
    }

    args.extend(scope_identity_args(scope));
    if scope.requires_location() && !submission.location.is_empty() {
        args.push("--location".to_string());
        args.push(submission.location.clone());
    }

    args.push("--output".to_string());
    args.push("json".to_string());
    args
}

fn operation_list_args(scope: &TargetScope, deployment_name: &str) -> Vec<String> {
    let mut args = vec![
        "deployment".to_string(),
        "operation".to_string(),
        scope_group(scope).to_string(),
        "list".to_string(),
        "--name".to_string(),
        deployment_name.to_string(),
    ];
    args.extend(scope_identity_args(scope));
    args.push("--output".to_string());
    args.push("json".to_string());
    args
}

fn delete_args(resource_id: &str) -> Vec<String> {
    vec![
        "resource".to_string(),
        "delete".to_string(),
        "--ids".to_string(),
        resource_id.to_string(),
    ]
}

fn override_document(parameters: &ParameterOverrides) -> Value {
    let values: serde_json::Map<String, Value> = parameters
        .iter()
        .map(|(name, value)| (name.clone(), json!({ "value": value })))
        .collect();
    json!({
        "$schema": PARAMETER_FILE_SCHEMA,
        "contentVersion": "1.0.0.0",
        "parameters": values,
    })
}

fn write_override_file(parameters: &ParameterOverrides) -> ProviderResult<Option<NamedTempFile>> {
    if parameters.is_empty() {
        return Ok(None);
    }
    let mut file = tempfile::Builder::new()
        .prefix("iacdeploy-overrides-")
        .suffix(".json")
        .tempfile()?;
    let content = serde_json::to_string_pretty(&override_document(parameters))
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(Some(file))
}

/// Extract a provider error from CLI stderr
///
/// Handles both the JSON form (`ERROR: {"code": ...}`) and the
/// `ERROR: (Code) message` form.
fn parse_error_output(stderr: &str) -> Option<ProviderDiagnostic> {
    if let Some(start) = stderr.find('{') {
        let parsed = serde_json::Deserializer::from_str(&stderr[start..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok);
        if let Some(value) = parsed {
            let inner = value.get("error").cloned().unwrap_or(value);
            if let Ok(diagnostic) = serde_json::from_value::<ProviderDiagnostic>(inner) {
                if !diagnostic.code.is_empty() || !diagnostic.message.is_empty() {
                    return Some(diagnostic);
                }
            }
        }
    }

    let line = stderr
        .lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("ERROR:"))?
        .trim();
    let (code, message) = match line.strip_prefix('(').and_then(|r| r.split_once(')')) {
        Some((code, message)) => (code.trim(), message.trim()),
        None => ("", line),
    };
    Some(ProviderDiagnostic::new(code, message))
}

fn is_not_found(stderr: &str) -> bool {
    ["ResourceNotFound", "ResourceGroupNotFound", "DeploymentNotFound", "could not be found"]
        .iter()
        .any(|needle| stderr.contains(needle))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzAccount {
    id: Option<String>,
    tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzDeployment {
    #[serde(default)]
    name: String,
    #[serde(default)]
    properties: AzDeploymentProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzDeploymentProperties {
    #[serde(default)]
    provisioning_state: String,
    #[serde(default)]
    outputs: Option<DeploymentOutputs>,
    #[serde(default)]
    error: Option<ProviderDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct AzOperation {
    #[serde(default)]
    properties: AzOperationProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzOperationProperties {
    #[serde(default)]
    provisioning_operation: String,
    #[serde(default)]
    provisioning_state: String,
    #[serde(default)]
    target_resource: Option<AzTargetResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzTargetResource {
    id: Option<String>,
    resource_type: Option<String>,
}

fn parse_json<T: for<'de> Deserialize<'de>>(stdout: &str) -> ProviderResult<T> {
    serde_json::from_str(stdout).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn parse_operations(stdout: &str) -> ProviderResult<Vec<DeploymentOperation>> {
    let operations: Vec<AzOperation> = parse_json(stdout)?;
    Ok(operations
        .into_iter()
        .map(|op| {
            let target = op.properties.target_resource;
            DeploymentOperation {
                resource_id: target.as_ref().and_then(|t| t.id.clone()),
                resource_type: target.and_then(|t| t.resource_type),
                kind: OperationKind::from_provider(&op.properties.provisioning_operation),
                state: DeploymentState::from_provisioning_state(
                    &op.properties.provisioning_state,
                ),
            }
        })
        .collect())
}

impl DeploymentProvider for AzCliProvider {
    fn context(&self) -> ProviderResult<ProviderContext> {
        let args: Vec<String> = ["account", "show", "--output", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = self.run(&args)?;
        if !output.success {
            return Err(self.command_failed(&args, &output.stderr));
        }
        let account: AzAccount = parse_json(&output.stdout)?;
        Ok(ProviderContext {
            tenant_id: account.tenant_id,
            subscription_id: account.id,
        })
    }

    fn validate(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ValidationReport> {
        let (args, output) = self.run_deployment("validate", scope, submission)?;

        if output.success {
            let deployment: AzDeployment = parse_json(&output.stdout)?;
            return Ok(match deployment.properties.error {
                Some(diagnostic) => ValidationReport::invalid(diagnostic),
                None => ValidationReport::valid(),
            });
        }

        match parse_error_output(&output.stderr) {
            Some(diagnostic) => Ok(ValidationReport::invalid(diagnostic)),
            None => Err(self.command_failed(&args, &output.stderr)),
        }
    }

    fn create_deployment(
        &self,
        scope: &TargetScope,
        submission: &DeploymentSubmission,
    ) -> ProviderResult<ProviderDeployment> {
        let (args, output) = self.run_deployment("create", scope, submission)?;

        if !output.success {
            return match parse_error_output(&output.stderr) {
                Some(diagnostic) => Ok(ProviderDeployment {
                    name: submission.name.clone(),
                    state: DeploymentState::Failed,
                    outputs: DeploymentOutputs::new(),
                    error: Some(diagnostic),
                }),
                None => Err(self.command_failed(&args, &output.stderr)),
            };
        }

        let deployment: AzDeployment = parse_json(&output.stdout)?;
        let name = if deployment.name.is_empty() {
            submission.name.clone()
        } else {
            deployment.name
        };
        Ok(ProviderDeployment {
            name,
            state: DeploymentState::from_provisioning_state(
                &deployment.properties.provisioning_state,
            ),
            outputs: deployment.properties.outputs.unwrap_or_default(),
            error: deployment.properties.error,
        })
    }

    fn list_operations(
        &self,
        scope: &TargetScope,
        deployment_name: &str,
    ) -> ProviderResult<Vec<DeploymentOperation>> {
        let args = operation_list_args(scope, deployment_name);
        let output = self.run(&args)?;
        if !output.success {
            if is_not_found(&output.stderr) {
                return Err(ProviderError::DeploymentNotFound(deployment_name.to_string()));
            }
            return Err(self.command_failed(&args, &output.stderr));
        }
        parse_operations(&output.stdout)
    }

    fn delete_resource(
        &self,
        _scope: &TargetScope,
        resource_id: &str,
    ) -> ProviderResult<DeletionStatus> {
        let args = delete_args(resource_id);
        let output = self.run(&args)?;
        if output.success {
            return Ok(DeletionStatus::Deleted);
        }
        if is_not_found(&output.stderr) {
            return Ok(DeletionStatus::AlreadyAbsent);
        }
        Err(self.command_failed(&args, &output.stderr))
    }
}
