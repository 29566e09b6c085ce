//! Shared utilities for UTR.

use regex::Regex;
use std::sync::OnceLock;

fn secret_assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"\b((?:[A-Z0-9]+_)*(?:TOKEN|PASSWORD|PASS|SECRET|SECRET_KEY|API_KEY|PRIVATE_KEY|DATABASE_URL)=)(?:"[^"]*"|'[^']*'|\S*)"#,
        )
        .expect("secret assignment pattern is valid")
    })
}

fn secret_flag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(--(?:token|password|api-key|secret)(?:=|\s+))(?:"[^"]*"|'[^']*'|\S+)"#)
            .expect("secret flag pattern is valid")
    })
}

/// Mask sensitive patterns in a command string before logging.
///
/// Test commands and hooks often carry credentials as inline environment
/// assignments (`DATABASE_URL=... nosetests`) or flags. The key or flag is
/// kept and the value replaced with `***`.
pub fn mask_sensitive_command(cmd: &str) -> String {
    let masked = secret_assignment_regex().replace_all(cmd, "${1}***");
    secret_flag_regex().replace_all(&masked, "${1}***").into_owned()
}
