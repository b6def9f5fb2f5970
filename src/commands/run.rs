use anyhow::Result;

use iacdeploy::config::Settings;
use iacdeploy::presentation::factory;

use crate::cli::RunArgs;
use crate::ui::context::UiContext;
use crate::ui::output::{print_outputs, print_warnings};

/// Tokens, validation, deployment, outputs and removal in one go
pub fn cmd_run(args: RunArgs, settings: Settings, ctx: &UiContext) -> Result<()> {
    // Scope conflicts are reported through the run's own warnings
    let options = super::pipeline_options(
        &args.template,
        &args.tokens,
        args.scope.selector(),
        args.deployment_name.as_deref(),
    )
    .with_removal(args.remove_deployment);

    let provider = factory::create_provider(&settings);
    let report = factory::create_orchestrator(provider, settings)
        .with_command("run")
        .with_event_sink(super::event_sink(ctx, "run"))
        .execute(&options)?;

    // Cleanup warnings are shown even when the deployment failed
    print_warnings(&report.warnings, ctx);
    let report = report.into_result()?;
    if !ctx.json {
        print_outputs(&report.context.outputs);
    }
    Ok(())
}
