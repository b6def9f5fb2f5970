//! ARM JSON template interpretation for the local provider
//!
//! Supports what is needed to simulate a deployment: parameter binding,
//! `[parameters('x')]` references, resource conditions, child resources,
//! inline nested deployments and outputs. Other template expressions are
//! kept as literal strings.

use std::path::Path;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::entities::{strip_json_comments, DeploymentState, TemplateFormat};
use crate::domain::ports::{
    DeploymentOutputs, DeploymentSubmission, OutputValue, ProviderError, ProviderResult,
};
use crate::domain::value_objects::ProviderDiagnostic;

pub(super) const DEPLOYMENTS_TYPE: &str = "Microsoft.Resources/deployments";

/// Template with its parameter values bound
#[derive(Debug, Clone)]
pub(super) struct BoundTemplate {
    template: Map<String, Value>,
    parameters: Map<String, Value>,
    hash: String,
}

impl BoundTemplate {
    pub(super) fn hash(&self) -> &str {
        &self.hash
    }
}

#[derive(Debug)]
pub(super) enum Binding {
    Bound(BoundTemplate),
    Rejected(ProviderDiagnostic),
}

/// One resource operation produced by evaluating a template
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PlannedOperation {
    pub resource_id: String,
    pub resource_type: String,
    pub state: DeploymentState,
}

#[derive(Debug, Clone)]
pub(super) struct NestedDeployment {
    pub name: String,
    pub evaluation: Evaluation,
}

/// Outcome of applying a bound template
#[derive(Debug, Clone)]
pub(super) struct Evaluation {
    pub state: DeploymentState,
    pub operations: Vec<PlannedOperation>,
    pub nested: Vec<NestedDeployment>,
    pub outputs: DeploymentOutputs,
    pub error: Option<ProviderDiagnostic>,
}

impl Evaluation {
    fn rejected(diagnostic: ProviderDiagnostic) -> Self {
        Self {
            state: DeploymentState::Failed,
            operations: Vec::new(),
            nested: Vec::new(),
            outputs: DeploymentOutputs::new(),
            error: Some(diagnostic),
        }
    }
}

/// Read the template and parameter file of a submission and bind parameters
pub(super) fn bind(submission: &DeploymentSubmission) -> ProviderResult<Binding> {
    if TemplateFormat::from_path(&submission.template_file) == Some(TemplateFormat::Bicep) {
        return Err(ProviderError::Unsupported(format!(
            "the local provider only understands ARM JSON templates, not Bicep ({})",
            submission.template_file.display()
        )));
    }

    let text = read(&submission.template_file)?;
    let template = match serde_json::from_str::<Value>(&strip_json_comments(&text)) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Ok(Binding::Rejected(ProviderDiagnostic::new(
                "InvalidTemplate",
                "The template root must be a JSON object.",
            )))
        }
        Err(e) => {
            return Ok(Binding::Rejected(ProviderDiagnostic::new(
                "InvalidTemplate",
                format!("Unable to parse the template: {}", e),
            )))
        }
    };

    let mut supplied = Map::new();
    if let Some(parameter_file) = &submission.parameter_file {
        match parse_parameter_file(&read(parameter_file)?) {
            Ok(values) => supplied = values,
            Err(message) => {
                return Ok(Binding::Rejected(
                    ProviderDiagnostic::new("InvalidParameterFile", message)
                        .with_target(parameter_file.display().to_string()),
                ))
            }
        }
    }
    for (name, value) in &submission.parameters {
        supplied.insert(name.clone(), value.clone());
    }

    let hash = format!("{:x}", Sha256::digest(text.as_bytes()));
    Ok(bind_parameters(template, supplied, hash))
}

fn read(path: &Path) -> ProviderResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ProviderError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Unwrap `{"parameters": {"x": {"value": ...}}}`
fn parse_parameter_file(text: &str) -> Result<Map<String, Value>, String> {
    let doc: Value =
        serde_json::from_str(&strip_json_comments(text)).map_err(|e| e.to_string())?;
    let Value::Object(root) = doc else {
        return Err("parameter file root must be a JSON object".to_string());
    };
    let params = match root.get("parameters") {
        Some(Value::Object(params)) => params.clone(),
        Some(_) => return Err("'parameters' must be a JSON object".to_string()),
        None => Map::new(),
    };

    Ok(params
        .into_iter()
        .map(|(name, entry)| {
            let value = match &entry {
                Value::Object(o) if o.contains_key("value") => o["value"].clone(),
                // Key Vault references are resolved by the real provider only.
                Value::Object(o) if o.contains_key("reference") => Value::Null,
                other => other.clone(),
            };
            (name, value)
        })
        .collect())
}

fn bind_parameters(
    template: Map<String, Value>,
    supplied: Map<String, Value>,
    hash: String,
) -> Binding {
    let declared = template
        .get("parameters")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut details = Vec::new();
    let mut parameters = Map::new();

    for (name, value) in &supplied {
        match declared.keys().find(|d| d.eq_ignore_ascii_case(name)) {
            Some(declared_name) => {
                parameters.insert(declared_name.clone(), value.clone());
            }
            None => details.push(ProviderDiagnostic::new(
                "InvalidTemplate",
                format!(
                    "The template parameter '{}' is not declared in the template.",
                    name
                ),
            )),
        }
    }

    for (name, decl) in &declared {
        if parameters.contains_key(name) {
            continue;
        }
        if let Some(default) = decl.get("defaultValue") {
            let value = resolve(default, &parameters);
            parameters.insert(name.clone(), value);
        } else if decl.get("nullable").and_then(Value::as_bool) == Some(true) {
            parameters.insert(name.clone(), Value::Null);
        } else {
            details.push(ProviderDiagnostic::new(
                "InvalidTemplate",
                format!(
                    "The value for the template parameter '{}' is not provided.",
                    name
                ),
            ));
        }
    }

    if !details.is_empty() {
        let mut diagnostic = ProviderDiagnostic::new(
            "InvalidTemplateDeployment",
            "The template deployment failed validation.",
        );
        diagnostic.details = details;
        return Binding::Rejected(diagnostic);
    }

    Binding::Bound(BoundTemplate {
        template,
        parameters,
        hash,
    })
}

/// Resolve `[parameters('x')]` references and `[[` escapes
pub(super) fn resolve(value: &Value, params: &Map<String, Value>) -> Value {
    match value {
        Value::String(s) => resolve_str(s, params),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve(v, params)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve(v, params)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_str(s: &str, params: &Map<String, Value>) -> Value {
    let trimmed = s.trim();
    if let Some(escaped) = trimmed.strip_prefix("[[") {
        return Value::String(format!("[{}", escaped));
    }
    if let Some(name) = trimmed
        .strip_prefix("[parameters('")
        .and_then(|rest| rest.strip_suffix("')]"))
    {
        if let Some((_, value)) = params.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            return value.clone();
        }
    }
    Value::String(s.to_string())
}

/// Build a resource id below a scope prefix
pub(super) fn resource_id(scope_prefix: &str, resource_type: &str, name: &str) -> String {
    let mut type_parts = resource_type.split('/');
    let namespace = type_parts.next().unwrap_or_default();
    let types: Vec<&str> = type_parts.collect();
    let names: Vec<&str> = name.split('/').collect();

    if namespace.eq_ignore_ascii_case("Microsoft.Resources")
        && types.len() == 1
        && types[0].eq_ignore_ascii_case("resourceGroups")
    {
        return format!("{}/resourceGroups/{}", subscription_prefix(scope_prefix), name);
    }

    let mut id = format!("{}/providers/{}", scope_prefix, namespace);
    for (i, ty) in types.iter().enumerate() {
        id.push('/');
        id.push_str(ty);
        if let Some(n) = names.get(i) {
            id.push('/');
            id.push_str(n);
        }
    }
    for n in names.iter().skip(types.len()) {
        id.push('/');
        id.push_str(n);
    }
    id
}

fn subscription_prefix(scope_prefix: &str) -> String {
    scope_prefix
        .strip_prefix("/subscriptions/")
        .and_then(|rest| rest.split('/').next())
        .map(|sub| format!("/subscriptions/{}", sub))
        .unwrap_or_else(|| scope_prefix.to_string())
}

#[derive(Debug, Clone)]
struct TemplateResource {
    symbolic: Option<String>,
    resource_type: String,
    name: String,
    depends_on: Vec<String>,
    enabled: bool,
    body: Map<String, Value>,
}

impl TemplateResource {
    fn is_deployment(&self) -> bool {
        self.resource_type.eq_ignore_ascii_case(DEPLOYMENTS_TYPE)
    }

    /// Whether a `dependsOn` entry refers to this resource
    fn matches(&self, dependency: &str) -> bool {
        let dep = dependency.trim();
        let eq = |candidate: &str| candidate.eq_ignore_ascii_case(dep);
        if self.symbolic.as_deref().is_some_and(eq)
            || eq(&self.name)
            || eq(&format!("{}/{}", self.resource_type, self.name))
        {
            return true;
        }

        // Expression form, e.g. [resourceId('Microsoft.KeyVault/vaults', 'kv')]
        let last = self.name.rsplit('/').next().unwrap_or_default();
        dep.starts_with('[')
            && !last.is_empty()
            && dep
                .to_ascii_lowercase()
                .contains(&format!("'{}'", last.to_ascii_lowercase()))
    }
}

fn collect_resources(
    template: &Map<String, Value>,
    params: &Map<String, Value>,
) -> Vec<TemplateResource> {
    let mut out = Vec::new();
    match template.get("resources") {
        Some(Value::Array(items)) => {
            for item in items {
                push_resource(None, item, None, params, &mut out);
            }
        }
        // languageVersion 2.0: symbolic name -> resource
        Some(Value::Object(map)) => {
            for (symbolic, item) in map {
                push_resource(Some(symbolic), item, None, params, &mut out);
            }
        }
        _ => {}
    }
    out
}

fn push_resource(
    symbolic: Option<&str>,
    item: &Value,
    parent: Option<(&str, &str)>,
    params: &Map<String, Value>,
    out: &mut Vec<TemplateResource>,
) {
    let Some(obj) = item.as_object() else {
        return;
    };
    let Some(short_type) = obj.get("type").and_then(Value::as_str) else {
        return;
    };

    let short_name = match obj.get("name").map(|n| resolve(n, params)) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let (resource_type, name) = match parent {
        Some((parent_type, parent_name)) if !short_type.contains('/') => (
            format!("{}/{}", parent_type, short_type),
            format!("{}/{}", parent_name, short_name),
        ),
        _ => (short_type.to_string(), short_name),
    };

    let enabled = !matches!(
        obj.get("condition").map(|c| resolve(c, params)),
        Some(Value::Bool(false))
    );

    let depends_on = obj
        .get("dependsOn")
        .and_then(Value::as_array)
        .map(|deps| {
            deps.iter()
                .filter_map(|d| resolve(d, params).as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    out.push(TemplateResource {
        symbolic: symbolic.map(str::to_string),
        resource_type: resource_type.clone(),
        name: name.clone(),
        depends_on,
        enabled,
        body: obj.clone(),
    });

    if let Some(children) = obj.get("resources").and_then(Value::as_array) {
        for child in children {
            push_resource(None, child, Some((&resource_type, &name)), params, out);
        }
    }
}

/// Apply a bound template below a scope prefix
///
/// Resources are applied in template order. A resource depending on
/// something the template does not define fails, leaving the resources
/// before it in place.
pub(super) fn evaluate(bound: &BoundTemplate, scope_prefix: &str) -> Evaluation {
    let resources = collect_resources(&bound.template, &bound.parameters);

    let mut operations = Vec::new();
    let mut nested = Vec::new();
    let mut failure: Option<ProviderDiagnostic> = None;

    for resource in resources.iter().filter(|r| r.enabled) {
        let id = resource_id(scope_prefix, &resource.resource_type, &resource.name);

        let missing = resource
            .depends_on
            .iter()
            .find(|dep| !resources.iter().any(|other| other.matches(dep)));
        if let Some(missing) = missing {
            operations.push(PlannedOperation {
                resource_id: id.clone(),
                resource_type: resource.resource_type.clone(),
                state: DeploymentState::Failed,
            });
            failure = Some(
                ProviderDiagnostic::new(
                    "ResourceDependencyNotFound",
                    format!(
                        "The resource '{}' depends on '{}', which is not defined in the template.",
                        resource.name, missing
                    ),
                )
                .with_target(id),
            );
            break;
        }

        if resource.is_deployment() {
            let inner = evaluate_nested(resource, scope_prefix, &bound.parameters);
            let state = inner.state;
            let inner_error = inner.error.clone();
            operations.push(PlannedOperation {
                resource_id: id.clone(),
                resource_type: resource.resource_type.clone(),
                state,
            });
            nested.push(NestedDeployment {
                name: resource.name.clone(),
                evaluation: inner,
            });
            if !state.is_success() {
                failure = Some(inner_error.unwrap_or_else(|| {
                    ProviderDiagnostic::new("DeploymentFailed", "Nested deployment failed.")
                }));
                break;
            }
            continue;
        }

        operations.push(PlannedOperation {
            resource_id: id,
            resource_type: resource.resource_type.clone(),
            state: DeploymentState::Succeeded,
        });
    }

    if let Some(detail) = failure {
        return Evaluation {
            state: DeploymentState::Failed,
            operations,
            nested,
            outputs: DeploymentOutputs::new(),
            error: Some(
                ProviderDiagnostic::new(
                    "DeploymentFailed",
                    "At least one resource deployment operation failed. Please list deployment operations for details.",
                )
                .with_detail(detail),
            ),
        };
    }

    Evaluation {
        state: DeploymentState::Succeeded,
        operations,
        nested,
        outputs: evaluate_outputs(bound),
        error: None,
    }
}

fn evaluate_nested(
    resource: &TemplateResource,
    scope_prefix: &str,
    outer_params: &Map<String, Value>,
) -> Evaluation {
    let properties = resource.body.get("properties").and_then(Value::as_object);

    let template = properties
        .and_then(|p| p.get("template"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let supplied: Map<String, Value> = properties
        .and_then(|p| p.get("parameters"))
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.clone(), resolve(v.get("value").unwrap_or(v), outer_params)))
                .collect()
        })
        .unwrap_or_default();

    let hash = format!(
        "{:x}",
        Sha256::digest(Value::Object(template.clone()).to_string().as_bytes())
    );
    match bind_parameters(template, supplied, hash) {
        Binding::Bound(bound) => evaluate(&bound, scope_prefix),
        Binding::Rejected(diagnostic) => Evaluation::rejected(diagnostic),
    }
}

fn evaluate_outputs(bound: &BoundTemplate) -> DeploymentOutputs {
    let Some(outputs) = bound.template.get("outputs").and_then(Value::as_object) else {
        return DeploymentOutputs::new();
    };

    outputs
        .iter()
        .map(|(name, decl)| {
            let value_type = decl
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("string")
                .to_string();
            let value = resolve(decl.get("value").unwrap_or(&Value::Null), &bound.parameters);
            (name.clone(), OutputValue { value_type, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RG: &str = "/subscriptions/s/resourceGroups/rg";

    fn bound(template: Value, supplied: Value) -> BoundTemplate {
        let Value::Object(template) = template else {
            panic!("template must be an object")
        };
        let Value::Object(supplied) = supplied else {
            panic!("supplied must be an object")
        };
        match bind_parameters(template, supplied, String::new()) {
            Binding::Bound(b) => b,
            Binding::Rejected(d) => panic!("unexpected rejection: {d}"),
        }
    }

    #[test]
    fn resource_ids_per_type_depth() {
        assert_eq!(
            resource_id(RG, "Microsoft.KeyVault/vaults", "kv"),
            format!("{RG}/providers/Microsoft.KeyVault/vaults/kv")
        );
        assert_eq!(
            resource_id(RG, "Microsoft.KeyVault/vaults/secrets", "kv/s1"),
            format!("{RG}/providers/Microsoft.KeyVault/vaults/kv/secrets/s1")
        );
        assert_eq!(
            resource_id("/subscriptions/s", "Microsoft.Resources/resourceGroups", "rg2"),
            "/subscriptions/s/resourceGroups/rg2"
        );
    }

    #[test]
    fn resolve_parameter_references_and_escapes() {
        let params: Map<String, Value> = [("name".to_string(), json!("kv-01"))]
            .into_iter()
            .collect();
        assert_eq!(resolve(&json!("[parameters('NAME')]"), &params), json!("kv-01"));
        assert_eq!(resolve(&json!("[[literal]"), &params), json!("[literal]"));
        assert_eq!(
            resolve(&json!({"a": ["[parameters('name')]"]}), &params),
            json!({"a": ["kv-01"]})
        );
        assert_eq!(
            resolve(&json!("[resourceGroup().location]"), &params),
            json!("[resourceGroup().location]")
        );
    }

    #[test]
    fn binding_rejects_missing_and_undeclared_parameters() {
        let template = json!({
            "parameters": { "name": { "type": "string" }, "sku": { "type": "string", "defaultValue": "S1" } }
        });
        let Value::Object(template) = template else { unreachable!() };
        let supplied: Map<String, Value> =
            [("extra".to_string(), json!(1))].into_iter().collect();

        let Binding::Rejected(diagnostic) = bind_parameters(template, supplied, String::new())
        else {
            panic!("expected rejection")
        };
        assert_eq!(diagnostic.code, "InvalidTemplateDeployment");
        assert_eq!(diagnostic.details.len(), 2);
        assert!(diagnostic.details[0].message.contains("'extra'"));
        assert!(diagnostic.details[1].message.contains("'name'"));
    }

    #[test]
    fn parameter_file_values_are_unwrapped() {
        let values = parse_parameter_file(
            r#"{"parameters": {"a": {"value": 1}, "b": {"reference": {"keyVault": {}}}}}"#,
        )
        .unwrap();
        assert_eq!(values["a"], json!(1));
        assert_eq!(values["b"], Value::Null);
        assert!(parse_parameter_file("[]").is_err());
        assert!(parse_parameter_file(r#"{"parameters": 3}"#).is_err());
    }

    #[test]
    fn commented_parameter_file_is_accepted() {
        let values = parse_parameter_file(
            "{\n  // test values\n  \"parameters\": { \"a\": { \"value\": \"x\" } /* done */ }\n}",
        )
        .unwrap();
        assert_eq!(values["a"], json!("x"));
    }

    #[test]
    fn evaluation_creates_resources_and_outputs() {
        let b = bound(
            json!({
                "parameters": { "name": { "type": "string" } },
                "resources": [
                    { "type": "Microsoft.KeyVault/vaults", "name": "[parameters('name')]",
                      "resources": [ { "type": "secrets", "name": "s1", "dependsOn": ["[parameters('name')]"] } ] },
                    { "type": "Microsoft.Storage/storageAccounts", "name": "st", "condition": false }
                ],
                "outputs": { "vaultName": { "type": "string", "value": "[parameters('name')]" } }
            }),
            json!({ "name": "kv-01" }),
        );

        let evaluation = evaluate(&b, RG);

        assert_eq!(evaluation.state, DeploymentState::Succeeded);
        let ids: Vec<_> = evaluation
            .operations
            .iter()
            .map(|o| o.resource_id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                format!("{RG}/providers/Microsoft.KeyVault/vaults/kv-01"),
                format!("{RG}/providers/Microsoft.KeyVault/vaults/kv-01/secrets/s1"),
            ]
        );
        assert_eq!(evaluation.outputs.get("vaultName").unwrap().value, json!("kv-01"));
    }

    #[test]
    fn outputs_follow_declaration_order() {
        let b = bound(
            json!({
                "resources": [],
                "outputs": {
                    "zone": { "type": "string", "value": "1" },
                    "address": { "type": "string", "value": "10.0.0.4" },
                    "mask": { "type": "int", "value": 24 }
                }
            }),
            json!({}),
        );

        let evaluation = evaluate(&b, RG);

        let names: Vec<&str> = evaluation.outputs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zone", "address", "mask"]);
    }

    #[test]
    fn unknown_dependency_fails_and_keeps_earlier_resources() {
        let b = bound(
            json!({
                "resources": [
                    { "type": "Microsoft.Network/virtualNetworks", "name": "vnet" },
                    { "type": "Microsoft.Network/privateEndpoints", "name": "pe", "dependsOn": ["missing"] },
                    { "type": "Microsoft.Storage/storageAccounts", "name": "st" }
                ],
                "outputs": { "x": { "type": "string", "value": "y" } }
            }),
            json!({}),
        );

        let evaluation = evaluate(&b, RG);

        assert_eq!(evaluation.state, DeploymentState::Failed);
        assert_eq!(evaluation.operations.len(), 2);
        assert_eq!(evaluation.operations[0].state, DeploymentState::Succeeded);
        assert_eq!(evaluation.operations[1].state, DeploymentState::Failed);
        assert!(evaluation.outputs.is_empty());
        let error = evaluation.error.unwrap();
        assert_eq!(error.code, "DeploymentFailed");
        assert_eq!(error.details[0].code, "ResourceDependencyNotFound");
    }

    #[test]
    fn nested_deployment_is_evaluated_inline() {
        let b = bound(
            json!({
                "parameters": { "prefix": { "type": "string" } },
                "resources": [{
                    "type": "Microsoft.Resources/deployments",
                    "name": "inner",
                    "properties": {
                        "parameters": { "n": { "value": "[parameters('prefix')]" } },
                        "template": {
                            "parameters": { "n": { "type": "string" } },
                            "resources": [ { "type": "Microsoft.Web/sites", "name": "[parameters('n')]" } ]
                        }
                    }
                }]
            }),
            json!({ "prefix": "app" }),
        );

        let evaluation = evaluate(&b, RG);

        assert_eq!(evaluation.state, DeploymentState::Succeeded);
        assert_eq!(evaluation.nested.len(), 1);
        assert_eq!(evaluation.nested[0].name, "inner");
        assert_eq!(
            evaluation.nested[0].evaluation.operations[0].resource_id,
            format!("{RG}/providers/Microsoft.Web/sites/app")
        );
        assert_eq!(evaluation.operations[0].resource_type, DEPLOYMENTS_TYPE);
    }

    #[test]
    fn symbolic_resources_and_dependencies() {
        let b = bound(
            json!({
                "languageVersion": "2.0",
                "resources": {
                    "vault": { "type": "Microsoft.KeyVault/vaults", "name": "kv" },
                    "lock": { "type": "Microsoft.Authorization/locks", "name": "lk", "dependsOn": ["vault"] }
                }
            }),
            json!({}),
        );

        let evaluation = evaluate(&b, RG);
        assert_eq!(evaluation.state, DeploymentState::Succeeded);
        assert_eq!(evaluation.operations.len(), 2);
    }
}
