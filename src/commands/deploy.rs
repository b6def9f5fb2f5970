use anyhow::Result;

use iacdeploy::config::Settings;
use iacdeploy::presentation::factory;

use crate::cli::DeployArgs;
use crate::ui::context::UiContext;
use crate::ui::output::{print_outputs, print_warnings};
use crate::ui::theme::Icon;

/// Validate and deploy; resources are left in place
pub fn cmd_deploy(args: DeployArgs, settings: Settings, ctx: &UiContext) -> Result<()> {
    let options = super::pipeline_options(
        &args.template,
        &args.tokens,
        args.scope.selector(),
        args.deployment_name.as_deref(),
    )
    .with_removal(false);

    let provider = factory::create_provider(&settings);
    let report = factory::create_orchestrator(provider, settings)
        .with_command("deploy")
        .with_event_sink(super::event_sink(ctx, "deploy"))
        .execute(&options)?;

    print_warnings(&report.warnings, ctx);
    match report.into_result() {
        Ok(report) => {
            if !ctx.json {
                print_outputs(&report.context.outputs);
            }
            Ok(())
        }
        Err(e) if args.suppress_failure => {
            if !ctx.json {
                eprintln!(
                    "{} {} (failure suppressed)",
                    Icon::Warning.render(ctx.color, ctx.unicode),
                    e
                );
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
