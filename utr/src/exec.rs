//! Shell execution of composed test commands.

use colored::Colorize;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, warn};
use utr_common::{Candidate, ErrorCode, mask_sensitive_command};

use crate::error::CliError;

#[cfg(windows)]
const SHELL: (&str, &str) = ("cmd", "/C");
#[cfg(not(windows))]
const SHELL: (&str, &str) = ("bash", "-c");

/// Argument vector that runs `command` through the host shell.
pub fn shell_argv(command: &str) -> [String; 3] {
    [SHELL.0.to_string(), SHELL.1.to_string(), command.to_string()]
}

/// Run `command` in `working_dir`, streaming its output to the terminal.
///
/// A failing test command is not an error here; its status is returned.
pub async fn run(command: &Candidate, working_dir: &Path) -> Result<ExitStatus, CliError> {
    let [program, flag, script] = shell_argv(command.as_str());
    eprintln!("{} {}", "Running".cyan().bold(), command);
    debug!(
        "Spawning {} {} '{}' in {}",
        program,
        flag,
        mask_sensitive_command(&script),
        working_dir.display()
    );

    let status = Command::new(&program)
        .arg(&flag)
        .arg(&script)
        .current_dir(working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| CliError::Spawn {
            shell: program.clone(),
            working_dir: working_dir.to_path_buf(),
            source,
        })?;

    if status.success() {
        eprintln!("{}", "PASSED".green().bold());
    } else {
        warn!(
            "[{}] test command exited with {}",
            ErrorCode::ExecCommandFailed.code_string(),
            describe_exit(status.code())
        );
        eprintln!("{} ({})", "FAILED".red().bold(), describe_exit(status.code()));
    }
    Ok(status)
}

/// Human-readable exit status; `None` means killed by a signal.
pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Exit code `utr` should finish with after running a test command.
pub fn exit_code_for(status: &ExitStatus) -> u8 {
    match status.code() {
        Some(0) => 0,
        Some(code) => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
        None => 1,
    }
}
