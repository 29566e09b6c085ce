use utr_common::{ConfigSource, ToolInstance, load_settings};

use crate::common::{TestProject, assert_contains, assert_exit_code, init_test_logging};

#[test]
fn test_config_reports_file_and_defaults() {
    init_test_logging();
    crate::test_log!("TEST START: test_config_reports_file_and_defaults");

    let project = TestProject::new();
    let output = project.run(&["config", "--json"]);
    assert_exit_code(&output, 0);

    let entries: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("config --json prints JSON");
    let entries = entries.as_array().expect("array of entries");
    let find = |key: &str| {
        entries
            .iter()
            .find(|e| e["key"] == key)
            .unwrap_or_else(|| panic!("missing {key}"))
            .clone()
    };

    assert_eq!(find("test_command")["value"], "\"echo ran \"");
    assert_eq!(find("test_command")["source"]["kind"], "file");
    assert_eq!(find("test_delimiter")["source"]["kind"], "default");
    assert_eq!(find("test_root")["source"]["kind"], "workspace");
    crate::test_log!("TEST PASS: test_config_reports_file_and_defaults");
}

#[test]
fn test_env_override_is_reported() {
    init_test_logging();
    crate::test_log!("TEST START: test_env_override_is_reported");

    let project = TestProject::new();
    let output = project
        .command()
        .args(["config"])
        .env("UTR_TEST_COMMAND", "pytest ")
        .output()
        .expect("Failed to run utr config");
    assert_exit_code(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "\"pytest \"");
    assert_contains(&stdout, "$UTR_TEST_COMMAND");
    crate::test_log!("TEST PASS: test_env_override_is_reported");
}

#[test]
fn test_missing_section_is_fatal() {
    init_test_logging();
    crate::test_log!("TEST START: test_missing_section_is_fatal");

    let project = TestProject::with_config("[python_test_runner]\ntest_command = \"echo \"\n");
    let output = project.run(&["candidates", project.source_file.to_str().expect("utf-8")]);
    assert_exit_code(&output, 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_contains(&stderr, "python_unit_test_runner");
    assert_contains(&stderr, "UTR-E001");
    assert!(output.stdout.is_empty(), "nothing discovered before the error");
    crate::test_log!("TEST PASS: test_missing_section_is_fatal");
}

#[test]
fn test_fixture_settings_load_through_library() {
    init_test_logging();
    crate::test_log!("TEST START: test_fixture_settings_load_through_library");

    let project = TestProject::new();
    let loaded = load_settings(Some(&project.config_file), ToolInstance::Generic)
        .expect("generic section present");
    assert_eq!(loaded.settings.test_command, "echo generic ");
    assert_eq!(
        loaded.source_of("test_command"),
        ConfigSource::File(project.config_file.clone())
    );
    crate::test_log!("TEST PASS: test_fixture_settings_load_through_library");
}
