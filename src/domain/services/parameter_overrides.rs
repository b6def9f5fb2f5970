//! Default parameter injection
//!
//! Shared by validation and deployment so both send the same parameters.
//! A default is injected only when the template declares the parameter and
//! the caller has not already overridden it. Explicit overrides always win.

use serde_json::Value;

use crate::domain::entities::{ParameterOverrides, TemplateInfo};

/// Opt-in telemetry parameter recognised in templates
pub const TELEMETRY_PARAMETER: &str = "enableDefaultTelemetry";

/// Project-level parameter defaults derived from settings
pub fn project_defaults(enable_default_telemetry: Option<bool>) -> ParameterOverrides {
    let mut defaults = ParameterOverrides::new();
    if let Some(enabled) = enable_default_telemetry {
        defaults.insert(TELEMETRY_PARAMETER.to_string(), Value::Bool(enabled));
    }
    defaults
}

/// Overrides with applicable defaults injected
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParameters {
    pub parameters: ParameterOverrides,
    /// Names of parameters that came from defaults
    pub injected: Vec<String>,
}

pub fn effective_parameters(
    template: &TemplateInfo,
    overrides: &ParameterOverrides,
    defaults: &ParameterOverrides,
) -> EffectiveParameters {
    let mut parameters = overrides.clone();
    let mut injected = Vec::new();

    for (name, value) in defaults {
        let overridden = overrides.keys().any(|k| k.eq_ignore_ascii_case(name));
        if overridden || !template.declares(name) {
            continue;
        }
        parameters.insert(name.clone(), value.clone());
        injected.push(name.clone());
    }

    EffectiveParameters {
        parameters,
        injected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{TemplateFormat, TemplateParameter};

    fn template(params: &[&str]) -> TemplateInfo {
        TemplateInfo {
            format: TemplateFormat::ArmJson,
            parameters: params
                .iter()
                .map(|p| TemplateParameter {
                    name: p.to_string(),
                    required: false,
                })
                .collect(),
        }
    }

    #[test]
    fn default_injected_when_declared_and_not_overridden() {
        let result = effective_parameters(
            &template(&["name", TELEMETRY_PARAMETER]),
            &ParameterOverrides::new(),
            &project_defaults(Some(true)),
        );
        assert_eq!(
            result.parameters.get(TELEMETRY_PARAMETER),
            Some(&Value::Bool(true))
        );
        assert_eq!(result.injected, vec![TELEMETRY_PARAMETER.to_string()]);
    }

    #[test]
    fn explicit_override_wins() {
        let mut overrides = ParameterOverrides::new();
        overrides.insert(TELEMETRY_PARAMETER.to_string(), Value::Bool(false));

        let result = effective_parameters(
            &template(&[TELEMETRY_PARAMETER]),
            &overrides,
            &project_defaults(Some(true)),
        );
        assert_eq!(
            result.parameters.get(TELEMETRY_PARAMETER),
            Some(&Value::Bool(false))
        );
        assert!(result.injected.is_empty());
    }

    #[test]
    fn override_match_ignores_case() {
        let mut overrides = ParameterOverrides::new();
        overrides.insert("EnableDefaultTelemetry".to_string(), Value::Bool(false));

        let result = effective_parameters(
            &template(&[TELEMETRY_PARAMETER]),
            &overrides,
            &project_defaults(Some(true)),
        );
        assert_eq!(result.parameters.len(), 1);
        assert!(result.injected.is_empty());
    }

    #[test]
    fn not_injected_when_template_lacks_parameter() {
        let result = effective_parameters(
            &template(&["name"]),
            &ParameterOverrides::new(),
            &project_defaults(Some(true)),
        );
        assert!(result.parameters.is_empty());
    }

    #[test]
    fn no_settings_default_means_no_injection() {
        let result = effective_parameters(
            &template(&[TELEMETRY_PARAMETER]),
            &ParameterOverrides::new(),
            &project_defaults(None),
        );
        assert!(result.parameters.is_empty());
    }
}
