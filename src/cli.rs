use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;

use iacdeploy::config::ProviderKind;
use iacdeploy::domain::entities::ParameterOverrides;
use iacdeploy::ScopeSelector;

/// iacdeploy - validate, deploy and tear down infrastructure-as-code templates
#[derive(Parser, Debug)]
#[command(name = "iacdeploy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (YAML, JSON or TOML)
    #[arg(long, global = true, env = "IACDEPLOY_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Deployment provider: az or local
    #[arg(long, global = true)]
    pub provider: Option<ProviderKind>,

    /// State directory of the local provider
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that shape settings rather than a single command
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub settings: Option<PathBuf>,
    pub provider: Option<ProviderKind>,
    pub state_dir: Option<PathBuf>,
}

impl Cli {
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            settings: self.settings.clone(),
            provider: self.provider,
            state_dir: self.state_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace tokens, validate, deploy, publish outputs, then remove
    Run(RunArgs),

    /// Substitute tokens in a parameter file
    ReplaceTokens(ReplaceTokensArgs),

    /// Replace tokens and validate a template without deploying
    Validate(ValidateArgs),

    /// Replace tokens, validate and deploy; resources are kept
    Deploy(DeployArgs),

    /// Remove every resource a deployment created
    Remove(RemoveArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Deploy into this resource group
    #[arg(long)]
    pub resource_group_name: Option<String>,

    /// Subscription id
    #[arg(long)]
    pub subscription_id: Option<String>,

    /// Management group id
    #[arg(long)]
    pub management_group_id: Option<String>,
}

impl ScopeArgs {
    pub fn selector(&self) -> ScopeSelector {
        ScopeSelector {
            resource_group_name: self.resource_group_name.clone(),
            subscription_id: self.subscription_id.clone(),
            management_group_id: self.management_group_id.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Parameter file whose tokens are replaced in place
    #[arg(long)]
    pub parameter_file: PathBuf,

    /// Custom token (repeatable); wins over settings and built-in tokens
    #[arg(long = "token", value_name = "NAME=VALUE", value_parser = parse_token)]
    pub tokens: Vec<(String, String)>,

    /// Tenant id for the built-in tenantId token
    #[arg(long)]
    pub tenant_id: Option<String>,

    /// Object id of the deploying principal (deploymentSpId token)
    #[arg(long)]
    pub principal_id: Option<String>,

    /// Fail when a placeholder has no value
    #[arg(long)]
    pub strict_tokens: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Template to deploy
    #[arg(long)]
    pub template_file: PathBuf,

    /// Deployment location (region)
    #[arg(long)]
    pub location: String,

    /// Explicit template parameter (repeatable); VALUE is JSON or a plain string
    #[arg(long = "parameter", value_name = "NAME=VALUE", value_parser = parse_parameter)]
    pub parameters: Vec<(String, Value)>,
}

impl TemplateArgs {
    pub fn overrides(&self) -> ParameterOverrides {
        self.parameters.iter().cloned().collect()
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// Remove the deployment's resources afterwards
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub remove_deployment: bool,

    /// Deployment name (generated from the template location when omitted)
    #[arg(long)]
    pub deployment_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReplaceTokensArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// Show the result without writing the file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// Deployment name used for the validation call
    #[arg(long)]
    pub deployment_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub template: TemplateArgs,

    #[command(flatten)]
    pub scope: ScopeArgs,

    #[command(flatten)]
    pub tokens: TokenArgs,

    /// Deployment name (generated from the template location when omitted)
    #[arg(long)]
    pub deployment_name: Option<String>,

    /// Exit successfully even when the deployment fails
    #[arg(long)]
    pub suppress_failure: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Deployment whose resources are removed
    #[arg(long)]
    pub deployment_name: String,

    /// Template the deployment came from
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

fn parse_token(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("token name missing in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn parse_parameter(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = parse_token(raw)?;
    let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
    Ok((name, value))
}
