use anyhow::Result;
use serde_json::json;

use iacdeploy::config::Settings;
use iacdeploy::domain::ports::DeployEvent;
use iacdeploy::presentation::factory;

use crate::cli::ReplaceTokensArgs;
use crate::ui::context::UiContext;
use crate::ui::output::render_unified_diff;

/// Substitute tokens in a parameter file; `--dry-run` shows a diff instead
pub fn cmd_replace_tokens(
    args: ReplaceTokensArgs,
    settings: Settings,
    ctx: &UiContext,
) -> Result<()> {
    let selector = super::selector(&args.scope, ctx);
    let provider = factory::create_provider(&settings);
    let events = super::event_sink(ctx, "replace-tokens");

    let outcome = super::replace_tokens(
        &args.tokens,
        &selector,
        &settings,
        &*provider,
        args.dry_run,
        &*events,
    )?;

    if !ctx.json && args.dry_run {
        if outcome.changed() {
            print!(
                "{}",
                render_unified_diff(
                    &outcome.path.display().to_string(),
                    &outcome.original,
                    &outcome.replacement.content,
                    ctx.color,
                )
            );
        } else {
            println!("No changes to {}", outcome.path.display());
        }
    }

    events.on_event(DeployEvent::Completed {
        command: "replace-tokens",
        success: true,
        deployment_name: None,
        outputs: json!({}),
        warnings: outcome.replacement.unresolved.len(),
    });
    Ok(())
}
