use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;

use iacdeploy::config::Settings;
use iacdeploy::domain::entities::RemovalRequest;
use iacdeploy::domain::ports::DeployEvent;
use iacdeploy::presentation::factory;

use crate::cli::RemoveArgs;
use crate::ui::context::UiContext;

/// Remove what a deployment created; resources that cannot be deleted are
/// reported but do not fail the command
pub fn cmd_remove(args: RemoveArgs, settings: Settings, ctx: &UiContext) -> Result<()> {
    let scope = super::selector(&args.scope, ctx).resolve();
    let template = args.template_file.clone().unwrap_or_else(PathBuf::new);
    let events = super::event_sink(ctx, "remove");
    events.on_event(DeployEvent::Started {
        command: "remove",
        template: template.clone(),
        scope: scope.to_string(),
    });

    let provider = factory::create_provider(&settings);
    let report = factory::create_remover(provider)
        .with_event_sink(events.clone())
        .remove(&RemovalRequest::new(&args.deployment_name, template, scope))?;

    events.on_event(DeployEvent::Completed {
        command: "remove",
        success: true,
        deployment_name: Some(report.deployment_name.clone()),
        outputs: json!({}),
        warnings: report.warnings.len(),
    });
    Ok(())
}
