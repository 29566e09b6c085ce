//! Common types used across UTR components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::ConfigError;

/// Runner invocation used when the settings section does not name one.
pub const DEFAULT_TEST_COMMAND: &str = "nosetests ";

/// Separator between the module path and the class/method selector.
pub const DEFAULT_TEST_DELIMITER: &str = ":";

/// One logical test-runner instance.
///
/// Each instance reads its own settings section and keeps its own last-run
/// store, so switching instances never leaks the other's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolInstance {
    /// Python unit test runner (`python_unit_test_runner` section).
    #[default]
    Python,
    /// Generic unit test runner (`python_test_runner` section).
    Generic,
}

impl ToolInstance {
    /// Settings section (top-level TOML table) read by this instance.
    pub const fn settings_section(&self) -> &'static str {
        match self {
            Self::Python => "python_unit_test_runner",
            Self::Generic => "python_test_runner",
        }
    }

    /// Name of the persisted last-run store.
    pub const fn store_name(&self) -> &'static str {
        match self {
            Self::Python => "PythonUnitTestRunner.last-run",
            Self::Generic => "UnitTestRunner.last-run",
        }
    }

    /// Human-readable name used in messages.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Python => "Python Unit Test Runner",
            Self::Generic => "Unit Test Runner",
        }
    }
}

impl fmt::Display for ToolInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

impl FromStr for ToolInstance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "python_unit_test_runner" => Ok(Self::Python),
            "generic" | "python_test_runner" => Ok(Self::Generic),
            other => Err(format!(
                "unknown instance '{other}' (expected 'python' or 'generic')"
            )),
        }
    }
}

/// Settings section for one tool instance, as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Base directory for dotted-path translation and the working directory
    /// of executed commands. Defaults to the first workspace folder.
    #[serde(default)]
    pub test_root: Option<PathBuf>,
    /// Relative package roots below `test_root`, tried in order.
    #[serde(default)]
    pub project_roots: Vec<String>,
    /// Whether discovered test files are remapped through `project_roots`.
    #[serde(default)]
    pub use_project_root: bool,
    /// Command prefix the test target is appended to.
    #[serde(default = "default_test_command")]
    pub test_command: String,
    /// Command chained before the test command.
    #[serde(default)]
    pub before_test: Option<String>,
    /// Command chained after the test command.
    #[serde(default)]
    pub after_test: Option<String>,
    /// Separator between module path and selector.
    #[serde(default = "default_delimiter", alias = "test_delimeter")]
    pub test_delimiter: String,
    /// Colored status output.
    #[serde(default = "default_true")]
    pub show_color: bool,
    /// Extensions stripped from translated module paths.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            test_root: None,
            project_roots: Vec::new(),
            use_project_root: false,
            test_command: default_test_command(),
            before_test: None,
            after_test: None,
            test_delimiter: default_delimiter(),
            show_color: true,
            source_extensions: default_source_extensions(),
        }
    }
}

fn default_test_command() -> String {
    DEFAULT_TEST_COMMAND.to_string()
}

fn default_delimiter() -> String {
    DEFAULT_TEST_DELIMITER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_source_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

/// Token used to chain hook commands around the test command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainSeparator {
    /// `;` for POSIX shells.
    Posix,
    /// `&&` for Windows `cmd`.
    Windows,
}

impl ChainSeparator {
    /// Separator for the platform this binary was built for.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Token including surrounding spaces.
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Posix => " ; ",
            Self::Windows => " && ",
        }
    }
}

/// An executable command string. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Candidate(String);

impl Candidate {
    /// Wrap a command, rejecting blank strings.
    pub fn new(command: impl Into<String>) -> Option<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            None
        } else {
            Some(Self(command))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Candidate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "command must not be blank".to_string())
    }
}

impl From<Candidate> for String {
    fn from(candidate: Candidate) -> Self {
        candidate.0
    }
}

/// Everything needed to resolve and compose test commands for one
/// invocation. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    test_root: PathBuf,
    project_roots: Vec<String>,
    use_project_root: bool,
    test_command: String,
    before_hook: Option<String>,
    after_hook: Option<String>,
    delimiter: String,
    source_extensions: Vec<String>,
    chain: ChainSeparator,
}

impl ResolutionContext {
    /// Context with default settings rooted at `test_root`.
    pub fn new(test_root: impl Into<PathBuf>) -> Self {
        let defaults = RunnerSettings::default();
        Self {
            test_root: test_root.into(),
            project_roots: defaults.project_roots,
            use_project_root: defaults.use_project_root,
            test_command: normalize_test_command(&defaults.test_command),
            before_hook: None,
            after_hook: None,
            delimiter: defaults.test_delimiter,
            source_extensions: defaults.source_extensions,
            chain: ChainSeparator::host(),
        }
    }

    /// Build the context from a settings section.
    ///
    /// `test_root` falls back to the first workspace folder.
    pub fn from_settings(
        settings: &RunnerSettings,
        workspace_folders: &[PathBuf],
    ) -> Result<Self, ConfigError> {
        let test_root = settings
            .test_root
            .clone()
            .or_else(|| workspace_folders.first().cloned())
            .ok_or(ConfigError::NoTestRoot)?;

        Ok(Self::new(test_root)
            .with_project_roots(settings.project_roots.clone(), settings.use_project_root)
            .with_test_command(&settings.test_command)
            .with_hooks(settings.before_test.clone(), settings.after_test.clone())
            .with_delimiter(settings.test_delimiter.clone())
            .with_source_extensions(settings.source_extensions.clone()))
    }

    pub fn with_project_roots(mut self, roots: Vec<String>, use_project_root: bool) -> Self {
        self.project_roots = roots;
        self.use_project_root = use_project_root;
        self
    }

    pub fn with_test_command(mut self, command: &str) -> Self {
        self.test_command = normalize_test_command(command);
        self
    }

    /// Blank hooks are treated as unset.
    pub fn with_hooks(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.before_hook = before.filter(|h| !h.trim().is_empty());
        self.after_hook = after.filter(|h| !h.trim().is_empty());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    /// Override the host chain separator.
    pub fn with_chain_separator(mut self, chain: ChainSeparator) -> Self {
        self.chain = chain;
        self
    }

    pub fn test_root(&self) -> &Path {
        &self.test_root
    }

    pub fn project_roots(&self) -> &[String] {
        &self.project_roots
    }

    pub fn use_project_root(&self) -> bool {
        self.use_project_root
    }

    pub fn test_command(&self) -> &str {
        &self.test_command
    }

    pub fn before_hook(&self) -> Option<&str> {
        self.before_hook.as_deref()
    }

    pub fn after_hook(&self) -> Option<&str> {
        self.after_hook.as_deref()
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn source_extensions(&self) -> &[String] {
        &self.source_extensions
    }

    pub fn chain(&self) -> ChainSeparator {
        self.chain
    }
}

/// `nosetests` needs exactly one space between itself and the target.
pub fn normalize_test_command(command: &str) -> String {
    if command.contains("nosetests") {
        format!("{} ", command.trim_end_matches(' '))
    } else {
        command.to_string()
    }
}
