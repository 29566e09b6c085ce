//! Error Catalog for Unit Test Runner
//!
//! Every user-facing failure maps to a stable code (UTR-E001 through
//! UTR-E599) with a message and remediation steps.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                              |
//! |------------|-------------|------------------------------------------|
//! | E001-E099  | Config      | Settings file and environment problems   |
//! | E100-E199  | Resolution  | Test-target resolution and composition   |
//! | E200-E299  | Execution   | Launching the composed test command      |
//! | E500-E599  | Internal    | Internal/unexpected errors               |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code enumeration covering all UTR error scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// No settings file or settings section for the selected tool instance
    ConfigMissing,
    /// Settings file could not be read
    ConfigReadError,
    /// Settings file contains invalid TOML syntax
    ConfigParseError,
    /// Settings section contains values of the wrong type
    ConfigInvalidSection,
    /// Environment variable has invalid value
    ConfigEnvError,
    /// No test root configured and no workspace folder available
    ConfigNoTestRoot,

    // =========================================================================
    // Resolution Errors (E100-E199)
    // =========================================================================
    /// File is not located under the test root
    ResolveOutsideRoot,
    /// File has no recognized source extension
    ResolveNotASourceFile,
    /// Path cannot be represented as UTF-8 text
    ResolveNonUtf8Path,
    /// Composition produced an empty command
    ResolveBlankCommand,
    /// No previously run command is stored
    ResolveNoLastRun,

    // =========================================================================
    // Execution Errors (E200-E299)
    // =========================================================================
    /// Shell could not be spawned
    ExecSpawnFailed,
    /// Test command exited unsuccessfully
    ExecCommandFailed,

    // =========================================================================
    // Internal Errors (E500-E599)
    // =========================================================================
    /// Last-run store could not be read or written
    InternalRunStoreError,
    /// Interactive prompt failed
    InternalPromptError,
    /// Logging system error
    InternalLoggingError,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            Self::ConfigMissing => 1,
            Self::ConfigReadError => 2,
            Self::ConfigParseError => 3,
            Self::ConfigInvalidSection => 4,
            Self::ConfigEnvError => 5,
            Self::ConfigNoTestRoot => 6,

            Self::ResolveOutsideRoot => 100,
            Self::ResolveNotASourceFile => 101,
            Self::ResolveNonUtf8Path => 102,
            Self::ResolveBlankCommand => 103,
            Self::ResolveNoLastRun => 104,

            Self::ExecSpawnFailed => 200,
            Self::ExecCommandFailed => 201,

            Self::InternalRunStoreError => 500,
            Self::InternalPromptError => 501,
            Self::InternalLoggingError => 502,
        }
    }

    /// Returns the formatted error code string (e.g., "UTR-E001").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("UTR-E{:03}", self.code_number())
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Config,
            100..=199 => ErrorCategory::Resolution,
            200..=299 => ErrorCategory::Execution,
            _ => ErrorCategory::Internal,
        }
    }

    /// Returns the full error entry with all metadata.
    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// Returns the error message template.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ConfigMissing => "Settings for this test runner were not found",
            Self::ConfigReadError => "Failed to read settings file",
            Self::ConfigParseError => "Settings file contains invalid TOML syntax",
            Self::ConfigInvalidSection => "Settings section contains invalid values",
            Self::ConfigEnvError => "Environment variable has an invalid value",
            Self::ConfigNoTestRoot => "No test root is configured",

            Self::ResolveOutsideRoot => "File is not located under the test root",
            Self::ResolveNotASourceFile => "File has no recognized source extension",
            Self::ResolveNonUtf8Path => "File path is not valid UTF-8",
            Self::ResolveBlankCommand => "Resolved test command is empty",
            Self::ResolveNoLastRun => "No test has been run yet",

            Self::ExecSpawnFailed => "Failed to start the shell for the test command",
            Self::ExecCommandFailed => "Test command exited with a failure status",

            Self::InternalRunStoreError => "Failed to access the last-run store",
            Self::InternalPromptError => "Interactive prompt failed",
            Self::InternalLoggingError => "Failed to initialize logging",
        }
    }

    /// Returns remediation steps for this error.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ConfigMissing => &[
                "Create a .utr.toml file in your project root",
                "Add a [python_unit_test_runner] section (or [python_test_runner] for --instance generic)",
                "Or pass an explicit settings file with --config",
            ],
            Self::ConfigReadError => &[
                "Check file permissions on the settings file",
                "Make sure the path points to a regular file",
            ],
            Self::ConfigParseError => &[
                "Validate the TOML syntax of the settings file",
                "Quote string values such as test_command",
            ],
            Self::ConfigInvalidSection => &[
                "project_roots must be a list of strings",
                "use_project_root and show_color must be booleans",
            ],
            Self::ConfigEnvError => &[
                "Check UTR_* environment variables for typos",
                "Boolean variables accept true/false, 1/0, yes/no, on/off",
            ],
            Self::ConfigNoTestRoot => &[
                "Set test_root in the settings section",
                "Or pass a workspace folder with --folder",
            ],

            Self::ResolveOutsideRoot => &[
                "Check that test_root points at the directory your runner imports from",
                "Declare the package directory in project_roots and enable use_project_root",
            ],
            Self::ResolveNotASourceFile => &[
                "Open a source file before running its test",
                "Add the extension to source_extensions in the settings section",
            ],
            Self::ResolveNonUtf8Path => &["Rename the file or directory to use UTF-8 characters"],
            Self::ResolveBlankCommand => &[
                "Set test_command in the settings section",
                "Enter a non-empty command when prompted",
            ],
            Self::ResolveNoLastRun => &[
                "Run a test with `utr find` or `utr run` first",
                "Check that --instance matches the instance used previously",
            ],

            Self::ExecSpawnFailed => &[
                "Make sure bash (or cmd on Windows) is on PATH",
                "Check that test_root exists and is a directory",
            ],
            Self::ExecCommandFailed => &[
                "Read the test output above for failures",
                "Re-run the same command with `utr last`",
            ],

            Self::InternalRunStoreError => &[
                "Check permissions on the state directory",
                "Delete the corrupt *.last-run.json file to reset it",
            ],
            Self::InternalPromptError => &[
                "Run utr from an interactive terminal",
                "Use `utr candidates` to list commands without prompting",
            ],
            Self::InternalLoggingError => &["Check the UTR_LOG filter syntax"],
        }
    }

    /// Returns all error codes.
    #[must_use]
    pub const fn all() -> &'static [ErrorCode] {
        &[
            Self::ConfigMissing,
            Self::ConfigReadError,
            Self::ConfigParseError,
            Self::ConfigInvalidSection,
            Self::ConfigEnvError,
            Self::ConfigNoTestRoot,
            Self::ResolveOutsideRoot,
            Self::ResolveNotASourceFile,
            Self::ResolveNonUtf8Path,
            Self::ResolveBlankCommand,
            Self::ResolveNoLastRun,
            Self::ExecSpawnFailed,
            Self::ExecCommandFailed,
            Self::InternalRunStoreError,
            Self::InternalPromptError,
            Self::InternalLoggingError,
        ]
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

/// Error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Settings file and environment issues (E001-E099)
    Config,
    /// Test-target resolution issues (E100-E199)
    Resolution,
    /// Command execution issues (E200-E299)
    Execution,
    /// Internal/unexpected errors (E500-E599)
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable name for the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Resolution => "Resolution",
            Self::Execution => "Execution",
            Self::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Complete error entry with all metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Error code string (e.g., "UTR-E001")
    pub code: String,
    /// Error category
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Steps to remediate the error
    pub remediation: Vec<String>,
}

impl ErrorEntry {
    /// Formats the error for display with full remediation steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let mut output = format!("[{}] {}\n", self.code, self.message);

        if !self.remediation.is_empty() {
            output.push_str("\nRemediation steps:\n");
            for (i, step) in self.remediation.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        output
    }

    /// Formats the error as a single line.
    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}
