//! Errors raised by the `utr` binary and their catalog codes.

use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;
use utr_common::{ComposeError, ConfigError, ErrorCode, RunStoreError, TranslateError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no test has been run yet")]
    NoLastRun,

    #[error("cannot prompt: not attached to a terminal")]
    NotInteractive,

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("failed to start `{shell}` in {}: {source}", working_dir.display())]
    Spawn {
        shell: String,
        working_dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoLastRun => ErrorCode::ResolveNoLastRun,
            Self::NotInteractive | Self::Prompt(_) => ErrorCode::InternalPromptError,
            Self::Spawn { .. } => ErrorCode::ExecSpawnFailed,
            Self::Logging(_) => ErrorCode::InternalLoggingError,
        }
    }
}

/// First catalog code found along the error chain.
pub fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<CliError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<TranslateError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ComposeError>() {
            Some(e.code())
        } else {
            cause.downcast_ref::<RunStoreError>().map(RunStoreError::code)
        }
    })
}

/// Print a fatal error to stderr: the cause, then the catalog entry.
pub fn report(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);
    let Some(code) = error_code(err) else {
        return;
    };
    let entry = code.entry();
    eprintln!("{}", entry.format_brief().dimmed());
    for step in &entry.remediation {
        eprintln!("  {} {}", "hint:".yellow(), step);
    }
}
