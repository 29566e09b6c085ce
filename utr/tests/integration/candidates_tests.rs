use crate::common::{TestProject, assert_contains, assert_exit_code, init_test_logging};

fn candidates_json(project: &TestProject, extra: &[&str]) -> Vec<String> {
    let source = project.source_file.to_str().expect("utf-8 path");
    let mut args = vec!["candidates", source, "--json"];
    args.extend_from_slice(extra);
    let output = project.run(&args);
    assert_exit_code(&output, 0);
    serde_json::from_slice(&output.stdout).expect("candidates --json prints a JSON array")
}

#[test]
fn test_candidates_translate_through_project_root() {
    init_test_logging();
    crate::test_log!("TEST START: test_candidates_translate_through_project_root");

    let project = TestProject::new();
    let found = candidates_json(&project, &[]);
    assert_eq!(found, vec!["echo ran pkg.tests.test_foo".to_string()]);

    crate::test_log!("TEST PASS: test_candidates_translate_through_project_root");
}

#[test]
fn test_candidates_use_selected_instance() {
    init_test_logging();
    crate::test_log!("TEST START: test_candidates_use_selected_instance");

    let project = TestProject::new();
    let found = candidates_json(&project, &["--instance", "generic"]);
    // No project roots for this instance, so the raw path is used.
    assert_eq!(found.len(), 1);
    assert!(found[0].starts_with("echo generic "), "got {found:?}");
    assert!(found[0].ends_with("test_foo.py"), "got {found:?}");

    crate::test_log!("TEST PASS: test_candidates_use_selected_instance");
}

#[test]
fn test_candidates_include_every_convention_once() {
    init_test_logging();
    crate::test_log!("TEST START: test_candidates_include_every_convention_once");

    let project = TestProject::new();
    project.write("src/pkg/test_foo.py", "");
    project.write("src/pkg/unittests/unittest_foo.py", "");

    let mut found = candidates_json(&project, &[]);
    found.sort();
    assert_eq!(
        found,
        vec![
            "echo ran pkg.test_foo".to_string(),
            "echo ran pkg.tests.test_foo".to_string(),
            "echo ran pkg.unittests.unittest_foo".to_string(),
        ]
    );

    crate::test_log!("TEST PASS: test_candidates_include_every_convention_once");
}

#[test]
fn test_candidates_put_last_run_first_without_duplicates() {
    init_test_logging();
    crate::test_log!("TEST START: test_candidates_put_last_run_first_without_duplicates");

    let project = TestProject::new();
    let test_file = project.test_file.to_str().expect("utf-8 path");
    assert_exit_code(&project.run(&["run", test_file]), 0);

    let found = candidates_json(&project, &[]);
    assert_eq!(found, vec!["echo ran pkg.tests.test_foo".to_string()]);

    project.write("src/other/test_bar.py", "");
    let other = project.path("src/other/test_bar.py");
    assert_exit_code(&project.run(&["run", other.to_str().expect("utf-8 path")]), 0);

    let found = candidates_json(&project, &[]);
    assert_eq!(
        found,
        vec![
            "echo ran other.test_bar".to_string(),
            "echo ran pkg.tests.test_foo".to_string(),
        ]
    );

    crate::test_log!("TEST PASS: test_candidates_put_last_run_first_without_duplicates");
}

#[test]
fn test_no_candidates_is_not_an_error() {
    init_test_logging();
    crate::test_log!("TEST START: test_no_candidates_is_not_an_error");

    let project = TestProject::new();
    let lonely = project.write("src/pkg/lonely.py", "");
    let output = project.run(&["candidates", lonely.to_str().expect("utf-8 path")]);
    assert_exit_code(&output, 0);
    assert!(output.stdout.is_empty());
    assert_contains(&String::from_utf8_lossy(&output.stderr), "No test found");

    crate::test_log!("TEST PASS: test_no_candidates_is_not_an_error");
}
