use std::fs;

use crate::common::{
    TestProject, assert_contains, assert_exit_code, assert_path_exists, init_test_logging,
};

#[test]
fn test_run_executes_in_test_root_and_remembers() {
    init_test_logging();
    crate::test_log!("TEST START: test_run_executes_in_test_root_and_remembers");

    let project = TestProject::new();
    let test_file = project.test_file.to_str().expect("utf-8 path");
    let output = project.run(&["run", test_file]);
    assert_exit_code(&output, 0);
    assert_contains(&String::from_utf8_lossy(&output.stdout), "ran pkg.tests.test_foo");

    let store = project.store_file("PythonUnitTestRunner.last-run");
    assert_path_exists(&store);
    let raw = fs::read_to_string(&store).expect("read store");
    assert_contains(&raw, "last_test_run");
    assert_contains(&raw, "echo ran pkg.tests.test_foo");

    crate::test_log!("TEST PASS: test_run_executes_in_test_root_and_remembers");
}

#[test]
fn test_run_focus_appends_selector() {
    init_test_logging();
    crate::test_log!("TEST START: test_run_focus_appends_selector");

    let project = TestProject::new();
    let test_file = project.test_file.to_str().expect("utf-8 path");
    let output = project.run(&["run", test_file, "--focus"]);
    assert_exit_code(&output, 0);
    assert_contains(
        &String::from_utf8_lossy(&output.stdout),
        "ran pkg.tests.test_foo:FooTest.test_beta",
    );

    crate::test_log!("TEST PASS: test_run_focus_appends_selector");
}

#[test]
fn test_last_reruns_remembered_command() {
    init_test_logging();
    crate::test_log!("TEST START: test_last_reruns_remembered_command");

    let project = TestProject::new();
    let test_file = project.test_file.to_str().expect("utf-8 path");
    assert_exit_code(&project.run(&["run", test_file, "--focus"]), 0);

    let output = project.run(&["last"]);
    assert_exit_code(&output, 0);
    assert_contains(
        &String::from_utf8_lossy(&output.stdout),
        "ran pkg.tests.test_foo:FooTest.test_beta",
    );

    crate::test_log!("TEST PASS: test_last_reruns_remembered_command");
}

#[test]
fn test_last_without_history_fails() {
    init_test_logging();
    crate::test_log!("TEST START: test_last_without_history_fails");

    let project = TestProject::new();
    let output = project.run(&["last"]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "UTR-E104");

    crate::test_log!("TEST PASS: test_last_without_history_fails");
}

#[test]
fn test_instances_keep_separate_history() {
    init_test_logging();
    crate::test_log!("TEST START: test_instances_keep_separate_history");

    let project = TestProject::new();
    let test_file = project.test_file.to_str().expect("utf-8 path");
    assert_exit_code(&project.run(&["run", test_file]), 0);

    let output = project.run(&["last", "--instance", "generic"]);
    assert_exit_code(&output, 1);

    crate::test_log!("TEST PASS: test_instances_keep_separate_history");
}

#[test]
fn test_failing_command_is_still_remembered() {
    init_test_logging();
    crate::test_log!("TEST START: test_failing_command_is_still_remembered");

    let project = TestProject::with_config(
        "[python_unit_test_runner]\nproject_roots = [\"src\"]\nuse_project_root = true\ntest_command = \"false \"\nshow_color = false\n",
    );
    let test_file = project.test_file.to_str().expect("utf-8 path");
    let output = project.run(&["run", test_file]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "FAILED");

    let raw = fs::read_to_string(project.store_file("PythonUnitTestRunner.last-run"))
        .expect("store written");
    assert_contains(&raw, "false pkg.tests.test_foo");

    crate::test_log!("TEST PASS: test_failing_command_is_still_remembered");
}

#[test]
fn test_run_outside_test_root_fails() {
    init_test_logging();
    crate::test_log!("TEST START: test_run_outside_test_root_fails");

    let project = TestProject::new();
    let elsewhere = project.dir.path().join("elsewhere.py");
    fs::write(&elsewhere, "").expect("write file");
    let output = project.run(&["run", elsewhere.to_str().expect("utf-8 path")]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "UTR-E100");

    crate::test_log!("TEST PASS: test_run_outside_test_root_fails");
}

#[test]
fn test_find_without_terminal_reports_prompt_error() {
    init_test_logging();
    crate::test_log!("TEST START: test_find_without_terminal_reports_prompt_error");

    let project = TestProject::new();
    let source = project.source_file.to_str().expect("utf-8 path");
    let output = project.run(&["find", source]);
    assert_exit_code(&output, 1);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "UTR-E501");
    assert!(!project.store_file("PythonUnitTestRunner.last-run").exists());

    crate::test_log!("TEST PASS: test_find_without_terminal_reports_prompt_error");
}

#[test]
fn test_relative_config_path_anchors_relative_test_root() {
    init_test_logging();
    crate::test_log!("TEST START: test_relative_config_path_anchors_relative_test_root");

    let project = TestProject::with_config(
        r#"[python_unit_test_runner]
test_root = "."
project_roots = ["src"]
use_project_root = true
test_command = "echo ran "
show_color = false
"#,
    );
    let source = project.source_file.to_str().expect("utf-8 path");
    let output = project.run(&["--config", ".utr.toml", "candidates", source, "--json"]);
    assert_exit_code(&output, 0);
    let found: Vec<String> = serde_json::from_slice(&output.stdout).expect("JSON array");
    assert_eq!(found, vec!["echo ran pkg.tests.test_foo".to_string()]);

    let test_file = project.test_file.to_str().expect("utf-8 path");
    let output = project.run(&["--config", ".utr.toml", "run", test_file]);
    assert_exit_code(&output, 0);
    assert_contains(&String::from_utf8_lossy(&output.stdout), "ran pkg.tests.test_foo");

    crate::test_log!("TEST PASS: test_relative_config_path_anchors_relative_test_root");
}
