//! Command entry points
//!
//! Each command loads nothing itself: settings come in resolved, the
//! provider comes from the factory, progress goes to an event sink.

pub mod deploy;
pub mod remove;
pub mod replace_tokens;
pub mod run;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use iacdeploy::application::{
    build_token_map, PipelineOptions, ReplaceOptions, RunContext, TokenReplaceOutcome,
};
use iacdeploy::config::Settings;
use iacdeploy::domain::ports::{DeployEvent, DeployEventSink, DeploymentProvider};
use iacdeploy::infrastructure::JsonEventSink;
use iacdeploy::presentation::factory;
use iacdeploy::ScopeSelector;

use crate::cli::{GlobalArgs, ScopeArgs, TemplateArgs, TokenArgs};
use crate::ui::console::ConsoleEventSink;
use crate::ui::context::UiContext;
use crate::ui::output::print_config_warnings;

/// Settings from `--settings` or discovery, then env, then global flags
pub fn load_settings(global: &GlobalArgs, ctx: &UiContext) -> Result<Settings> {
    let (settings, warnings) = match &global.settings {
        Some(path) => {
            let (settings, warnings) = Settings::load_with_warnings(path)
                .with_context(|| format!("loading settings from {}", path.display()))?;
            (settings.with_env_overrides(), warnings)
        }
        None => {
            let cwd = std::env::current_dir().context("reading working directory")?;
            Settings::discover(&cwd)?
        }
    };
    print_config_warnings(&warnings, ctx);

    Ok(apply_global_flags(settings, global))
}

fn apply_global_flags(mut settings: Settings, global: &GlobalArgs) -> Settings {
    if let Some(kind) = global.provider {
        settings.provider.kind = kind;
    }
    if let Some(dir) = &global.state_dir {
        settings.provider.state_dir = Some(dir.clone());
    }
    debug!(provider = %settings.provider.kind, "settings resolved");
    settings
}

/// NDJSON on stdout in `--json` mode, progress lines on stderr otherwise
pub fn event_sink(ctx: &UiContext, command: &'static str) -> Arc<dyn DeployEventSink> {
    if ctx.json {
        Arc::new(JsonEventSink::stdout(command))
    } else {
        Arc::new(ConsoleEventSink::stderr(*ctx))
    }
}

/// Scope selector, warning when the identifiers are ambiguous
pub fn selector(scope: &ScopeArgs, ctx: &UiContext) -> ScopeSelector {
    let selector = scope.selector();
    if selector.is_ambiguous() && !ctx.json {
        eprintln!(
            "{} several scope identifiers given, using {}",
            crate::ui::theme::Icon::Warning.render(ctx.color, ctx.unicode),
            selector.resolve()
        );
    }
    selector
}

/// Pipeline inputs shared by `run` and `deploy`
pub fn pipeline_options(
    template: &TemplateArgs,
    tokens: &TokenArgs,
    selector: ScopeSelector,
    deployment_name: Option<&str>,
) -> PipelineOptions {
    let mut options = PipelineOptions::new(
        &template.template_file,
        &tokens.parameter_file,
        &template.location,
        selector,
    )
    .with_strict_tokens(tokens.strict_tokens);
    options.custom_tokens = tokens.tokens.clone();
    options.tenant_id = tokens.tenant_id.clone();
    options.principal_id = tokens.principal_id.clone();
    options.deployment_name = deployment_name.map(str::to_string);
    options.overrides = template.overrides();
    options
}

/// Replace tokens in the parameter file the way a run does
pub fn replace_tokens(
    args: &TokenArgs,
    selector: &ScopeSelector,
    settings: &Settings,
    provider: &dyn DeploymentProvider,
    dry_run: bool,
    events: &dyn DeployEventSink,
) -> Result<TokenReplaceOutcome> {
    let mut context = RunContext::from_selector(selector)
        .with_tenant(args.tenant_id.as_deref())
        .with_principal(args.principal_id.as_deref());
    match provider.context() {
        Ok(identity) => context = context.fill_from(&identity),
        Err(e) => debug!(error = %e, "provider identity unavailable"),
    }

    let tokens = build_token_map(&context, settings, &args.tokens);
    let outcome = factory::create_token_replacer().replace(
        &args.parameter_file,
        &tokens,
        &settings.delimiters(),
        ReplaceOptions {
            strict: args.strict_tokens,
            dry_run,
        },
    )?;

    events.on_event(DeployEvent::TokensReplaced {
        path: outcome.path.clone(),
        replaced: outcome.replacement.total_replaced(),
        unresolved: outcome.replacement.unresolved.clone(),
    });
    Ok(outcome)
}
