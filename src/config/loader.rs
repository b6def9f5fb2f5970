//! Settings loading
//!
//! Format is chosen by extension (`.yml`/`.yaml`, `.json`, `.toml`).
//! Unknown keys are collected as warnings instead of failing the load.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::value_objects::ConfigWarning;
use crate::error::{DeployError, DeployResult};

use super::types::Settings;

/// File names probed in the project root, in order
pub const SETTINGS_FILE_NAMES: &[&str] = &[
    "settings.yml",
    "settings.yaml",
    "settings.json",
    "settings.toml",
];

const KNOWN_KEYS: &[&str] = &[
    "parameterFileTokens",
    "tokenPrefix",
    "tokenSuffix",
    "localTokens",
    "name",
    "value",
    "enableDefaultTelemetry",
    "deployment",
    "retryLimit",
    "provider",
    "kind",
    "stateDir",
    "azPath",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsFormat {
    Yaml,
    Json,
    Toml,
}

impl SettingsFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => SettingsFormat::Json,
            Some("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Yaml,
        }
    }
}

/// Load settings and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> DeployResult<(Settings, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DeployError::InvalidSettings {
            file: path.to_path_buf(),
            message: "file does not exist".to_string(),
        },
        _ => DeployError::Io(e),
    })?;
    parse_with_warnings(path, &content)
}

/// Parse settings content; `path` selects the format and labels errors.
pub fn parse_with_warnings(
    path: &Path,
    content: &str,
) -> DeployResult<(Settings, Vec<ConfigWarning>)> {
    let invalid = |message: String| DeployError::InvalidSettings {
        file: path.to_path_buf(),
        message,
    };

    if content.trim().is_empty() {
        return Ok((Settings::default(), Vec::new()));
    }

    let mut unknown_paths: Vec<String> = Vec::new();
    let settings: Settings = match SettingsFormat::from_path(path) {
        SettingsFormat::Yaml => {
            let deserializer = serde_yaml_ng::Deserializer::from_str(content);
            serde_ignored::deserialize(deserializer, |p| unknown_paths.push(p.to_string()))
                .map_err(|e| invalid(e.to_string()))?
        }
        SettingsFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(content);
            let settings =
                serde_ignored::deserialize(&mut deserializer, |p| {
                    unknown_paths.push(p.to_string())
                })
                .map_err(|e| invalid(e.to_string()))?;
            deserializer.end().map_err(|e| invalid(e.to_string()))?;
            settings
        }
        SettingsFormat::Toml => {
            let deserializer = toml::de::Deserializer::new(content);
            serde_ignored::deserialize(deserializer, |p| unknown_paths.push(p.to_string()))
                .map_err(|e| invalid(e.to_string()))?
        }
    };

    validate(&settings).map_err(invalid)?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| {
            let leaf = key
                .split('.')
                .next_back()
                .unwrap_or(key.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &leaf),
                suggestion: suggest_key(&leaf),
                key,
                file: path.to_path_buf(),
            }
        })
        .collect();

    Ok((settings, warnings))
}

fn validate(settings: &Settings) -> Result<(), String> {
    if !settings.delimiters().is_valid() {
        return Err(
            "parameterFileTokens.tokenPrefix and parameterFileTokens.tokenSuffix must not be empty"
                .to_string(),
        );
    }
    if let Some(token) = settings
        .parameter_file_tokens
        .local_tokens
        .iter()
        .find(|t| t.name.trim().is_empty())
    {
        return Err(format!(
            "parameterFileTokens.localTokens has an entry without a name (value '{}')",
            token.value
        ));
    }
    Ok(())
}

/// Find the settings file to use for a project root, if any
pub fn find_settings_file(project_root: &Path) -> Option<PathBuf> {
    SETTINGS_FILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|p| p.is_file())
        .or_else(|| {
            user_settings_path().filter(|p| p.is_file())
        })
}

/// `<config_dir>/iacdeploy/settings.toml`
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("iacdeploy").join("settings.toml"))
}

/// Load from the project root, the user config, or defaults, then apply
/// environment overrides.
pub fn discover(project_root: &Path) -> DeployResult<(Settings, Vec<ConfigWarning>)> {
    match find_settings_file(project_root) {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            let (settings, warnings) = load_with_warnings(&path)?;
            Ok((with_env_overrides(settings), warnings))
        }
        None => {
            debug!("no settings file found, using defaults");
            Ok((with_env_overrides(Settings::default()), Vec::new()))
        }
    }
}

/// Apply environment variable overrides (IACDEPLOY_* prefix)
pub fn with_env_overrides(settings: Settings) -> Settings {
    with_overrides_from(settings, |key| std::env::var(key).ok())
}

pub(crate) fn with_overrides_from(
    mut settings: Settings,
    get_env: impl Fn(&str) -> Option<String>,
) -> Settings {
    // IACDEPLOY_TOKEN_PREFIX / IACDEPLOY_TOKEN_SUFFIX (ignored when empty)
    if let Some(prefix) = get_env("IACDEPLOY_TOKEN_PREFIX").filter(|v| !v.is_empty()) {
        settings.parameter_file_tokens.token_prefix = prefix;
    }
    if let Some(suffix) = get_env("IACDEPLOY_TOKEN_SUFFIX").filter(|v| !v.is_empty()) {
        settings.parameter_file_tokens.token_suffix = suffix;
    }

    // IACDEPLOY_ENABLE_DEFAULT_TELEMETRY
    if let Some(val) = get_env("IACDEPLOY_ENABLE_DEFAULT_TELEMETRY") {
        settings.enable_default_telemetry = match val.trim().to_lowercase().as_str() {
            "" => settings.enable_default_telemetry,
            "false" | "0" | "no" => Some(false),
            _ => Some(true),
        };
    }

    // IACDEPLOY_PROVIDER
    if let Some(kind) = get_env("IACDEPLOY_PROVIDER").and_then(|v| v.parse().ok()) {
        settings.provider.kind = kind;
    }

    // IACDEPLOY_STATE_DIR
    if let Some(dir) = get_env("IACDEPLOY_STATE_DIR").filter(|v| !v.is_empty()) {
        settings.provider.state_dir = Some(PathBuf::from(dir));
    }

    // IACDEPLOY_RETRY_LIMIT
    if let Some(limit) = get_env("IACDEPLOY_RETRY_LIMIT").and_then(|v| v.trim().parse().ok()) {
        settings.deployment.retry_limit = limit;
    }

    settings
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in KNOWN_KEYS {
        let dist = levenshtein(&unknown.to_lowercase(), &candidate.to_lowercase());
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
