use anyhow::Result;
use serde_json::json;

use iacdeploy::config::Settings;
use iacdeploy::domain::ports::DeployEvent;
use iacdeploy::presentation::factory;
use iacdeploy::DeploymentRequest;

use crate::cli::ValidateArgs;
use crate::ui::context::UiContext;

/// Replace tokens, then ask the provider to validate; nothing is deployed
pub fn cmd_validate(args: ValidateArgs, settings: Settings, ctx: &UiContext) -> Result<()> {
    let selector = super::selector(&args.scope, ctx);
    let scope = selector.resolve();
    let events = super::event_sink(ctx, "validate");
    events.on_event(DeployEvent::Started {
        command: "validate",
        template: args.template.template_file.clone(),
        scope: scope.to_string(),
    });

    let provider = factory::create_provider(&settings);
    super::replace_tokens(
        &args.tokens,
        &selector,
        &settings,
        &*provider,
        false,
        &*events,
    )?;

    let mut request = DeploymentRequest::new(&args.template.template_file, scope)
        .with_parameter_file(&args.tokens.parameter_file)
        .with_location(&args.template.location)
        .with_overrides(args.template.overrides());
    if let Some(name) = &args.deployment_name {
        request = request.with_deployment_name(name);
    }

    let outcome = factory::create_validator(provider, &settings)
        .with_event_sink(events.clone())
        .validate(&request)?;

    if !ctx.json && ctx.verbose > 0 && !outcome.injected.is_empty() {
        eprintln!("Injected defaults: {}", outcome.injected.join(", "));
    }

    events.on_event(DeployEvent::Completed {
        command: "validate",
        success: true,
        deployment_name: None,
        outputs: json!({}),
        warnings: 0,
    });
    Ok(())
}
