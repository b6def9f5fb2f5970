//! Deployment name generation
//!
//! Names look like `<base>-<yyyyMMddTHHmmssffffZ>` and never exceed
//! [`MAX_DEPLOYMENT_NAME_LEN`] characters. Caller-supplied names are held to
//! the same character set and length.

use std::path::Path;

use chrono::{DateTime, Timelike, Utc};

use crate::error::{DeployError, DeployResult};

/// Longest name the provider accepts for a deployment
pub const MAX_DEPLOYMENT_NAME_LEN: usize = 64;

const GENERIC_STEMS: &[&str] = &["main", "deploy", "azuredeploy", "template"];

/// Generate a deployment name for a template at a point in time
pub fn generate(template: &Path, now: DateTime<Utc>) -> String {
    let stamp = format!(
        "{}{:04}Z",
        now.format("%Y%m%dT%H%M%S"),
        now.nanosecond() % 1_000_000_000 / 100_000
    );

    let mut base = sanitize(&base_name(template));
    if base.is_empty() {
        base = "deployment".to_string();
    }

    let budget = MAX_DEPLOYMENT_NAME_LEN - stamp.len() - 1;
    if base.len() > budget {
        base.truncate(budget);
    }

    format!("{}-{}", base, stamp)
}

/// Template stem, or the parent directory for generic stems like `main`
fn base_name(template: &Path) -> String {
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    if GENERIC_STEMS.contains(&stem.to_lowercase().as_str()) {
        if let Some(dir) = template
            .parent()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
        {
            return dir;
        }
    }
    stem
}

/// Keep only characters valid in a deployment name
fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'))
        .collect()
}

/// Reject a caller-supplied name the provider would not accept
pub fn check(name: &str) -> DeployResult<()> {
    let reason = if name.is_empty() {
        "name is empty".to_string()
    } else if name.len() > MAX_DEPLOYMENT_NAME_LEN {
        format!(
            "name is {} characters long, at most {} are allowed",
            name.len(),
            MAX_DEPLOYMENT_NAME_LEN
        )
    } else if sanitize(name) != name {
        "only letters, digits, '-', '_', '.', '(' and ')' are allowed".to_string()
    } else {
        return Ok(());
    };

    Err(DeployError::InvalidDeploymentName {
        name: name.to_string(),
        reason,
    })
}
