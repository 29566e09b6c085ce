use crate::common::{assert_contains, init_test_logging, utr_command};

#[test]
fn test_utr_help_includes_description() {
    init_test_logging();
    crate::test_log!("TEST START: test_utr_help_includes_description");

    let output = utr_command()
        .arg("--help")
        .output()
        .expect("Failed to run utr --help");

    assert!(output.status.success(), "utr --help failed");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_contains(&stdout, "Unit Test Runner");
    for subcommand in ["find", "run", "last", "custom", "candidates", "config"] {
        assert_contains(&stdout, subcommand);
    }
    crate::test_log!("TEST PASS: test_utr_help_includes_description");
}

#[test]
fn test_unknown_instance_is_usage_error() {
    init_test_logging();
    crate::test_log!("TEST START: test_unknown_instance_is_usage_error");

    let output = utr_command()
        .args(["config", "--instance", "ruby"])
        .output()
        .expect("Failed to run utr");

    assert!(!output.status.success());
    assert_contains(&String::from_utf8_lossy(&output.stderr), "unknown instance");
    crate::test_log!("TEST PASS: test_unknown_instance_is_usage_error");
}
