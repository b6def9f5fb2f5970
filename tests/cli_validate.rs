//! `iacdeploy validate` replaces tokens and validates without deploying.

mod common;

use common::*;

fn validate(env: &TestEnv) -> TestResult {
    env.run(&[
        "validate",
        "--template-file",
        "main.json",
        "--parameter-file",
        "parameters.json",
        "--location",
        "westeurope",
        "--resource-group-name",
        "rg-test",
    ])
}

#[test]
fn valid_template_passes_without_touching_state() {
    let env = TestEnv::new();
    env.write_project_file("settings.yml", SETTINGS_YAML);
    env.write_project_file("main.json", VAULT_TEMPLATE);
    env.write_project_file("parameters.json", VAULT_PARAMETERS);

    let result = validate(&env);

    assert!(result.success, "validate failed:\n{}", result.combined_output());
    assert!(env
        .read_project_file("parameters.json")
        .contains("\"carml-kv\""));
    assert!(env.provider_state().is_null());
}

#[test]
fn missing_required_parameter_fails_validation() {
    let env = TestEnv::new();
    env.write_project_file("main.json", VAULT_TEMPLATE);
    env.write_project_file("parameters.json", r#"{"parameters":{}}"#);

    let result = validate(&env);

    assert!(!result.success);
    assert!(
        result.stderr.contains("validation failed"),
        "{}",
        result.stderr
    );
    assert!(env.provider_state().is_null());
}

#[test]
fn json_validation_failure_reports_kind() {
    let env = TestEnv::new();
    env.write_project_file("main.json", VAULT_TEMPLATE);
    env.write_project_file("parameters.json", r#"{"parameters":{}}"#);

    let result = env.run(&[
        "validate",
        "--json",
        "--template-file",
        "main.json",
        "--parameter-file",
        "parameters.json",
        "--location",
        "westeurope",
    ]);

    assert!(!result.success);
    let last = result.events().pop().unwrap();
    assert_eq!(last["event"], "error");
    assert_eq!(last["kind"], "template_validation");
}

#[test]
fn subscription_scope_needs_a_location() {
    let env = TestEnv::new();
    env.write_project_file("settings.yml", SETTINGS_YAML);
    env.write_project_file("main.json", VAULT_TEMPLATE);
    env.write_project_file("parameters.json", VAULT_PARAMETERS);

    let result = env.run(&[
        "validate",
        "--template-file",
        "main.json",
        "--parameter-file",
        "parameters.json",
        "--location",
        "",
    ]);

    assert!(!result.success);
    assert!(
        result.stderr.contains("InvalidDeploymentLocation"),
        "{}",
        result.stderr
    );
}
