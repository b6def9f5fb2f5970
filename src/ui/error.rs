use iacdeploy::DeployError;

use crate::ui::context::UiContext;
use crate::ui::theme::{colors, paint, Icon};

/// Short machine-readable name of an error
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<DeployError>() {
        Some(DeployError::MissingTemplateFile { .. }) => "missing_file",
        Some(DeployError::MissingTokenValue { .. }) => "missing_token_value",
        Some(DeployError::TemplateValidation { .. }) => "template_validation",
        Some(DeployError::Deployment { .. }) => "deployment",
        Some(DeployError::Provider(_)) => "provider",
        Some(DeployError::InvalidSettings { .. }) => "invalid_settings",
        Some(DeployError::InvalidTemplate { .. }) => "invalid_template",
        Some(DeployError::InvalidDeploymentName { .. }) => "invalid_deployment_name",
        Some(DeployError::Io(_)) => "io",
        None => "error",
    }
}

fn fix_hint(err: &DeployError) -> Option<String> {
    match err {
        DeployError::MissingTemplateFile { .. } => {
            Some("Check --template-file and --parameter-file point at existing files.".to_string())
        }
        DeployError::MissingTokenValue { tokens, .. } => Some(format!(
            "Pass --token {}=<value> or add it to parameterFileTokens.localTokens.",
            tokens.first().map(String::as_str).unwrap_or("name")
        )),
        DeployError::InvalidSettings { .. } => {
            Some("Fix the settings file or pass another one with --settings.".to_string())
        }
        DeployError::InvalidDeploymentName { .. } => Some(
            "Pick a --deployment-name of at most 64 letters, digits, '-', '_', '.', '(' or ')'."
                .to_string(),
        ),
        DeployError::Provider(_) => {
            Some("Run with -vv for the provider command and its output.".to_string())
        }
        _ => None,
    }
}

pub fn format_error(err: &anyhow::Error, ctx: &UiContext) -> String {
    let mut out = format!(
        "{} {}\n",
        Icon::Error.render(ctx.color, ctx.unicode),
        paint(&err.to_string(), colors::ERROR, ctx.color)
    );
    for cause in err.chain().skip(1) {
        out.push_str(&format!("  {} {}\n", Icon::Arrow.render(ctx.color, ctx.unicode), cause));
    }
    if let Some(hint) = err.downcast_ref::<DeployError>().and_then(fix_hint) {
        out.push_str(&format!("\n{}\n", paint(&hint, colors::DIM, ctx.color)));
    }
    out
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "kind": error_kind(err),
            "message": err.to_string(),
        });
        let _ = crate::ui::json::emit(output);
        return;
    }

    let ctx = UiContext::new(false, 0);
    if ctx.caps.is_ci && std::env::var("GITHUB_ACTIONS").is_ok() {
        eprintln!("::error::{}", err);
        return;
    }
    eprint!("{}", format_error(err, &ctx));
}
