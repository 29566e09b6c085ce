//! Configuration system for UTR.
//!
//! Settings live in a TOML file with one table per tool instance:
//!
//! ```toml
//! [python_unit_test_runner]
//! test_root = "/home/me/project"
//! project_roots = ["src", "lib/core"]
//! use_project_root = true
//! test_command = "nosetests -v"
//! before_test = "source .venv/bin/activate"
//! ```
//!
//! The file is found by walking up from the workspace folder looking for
//! `.utr.toml`, then falling back to `<config_dir>/utr/config.toml`.
//! `UTR_*` environment variables override individual keys.

pub mod env;
pub mod source;

pub use env::{EnvError, EnvParser};
pub use source::{ConfigSource, Sourced};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::errors::ErrorCode;
use crate::types::{RunnerSettings, ToolInstance};

/// Per-project settings file name.
pub const CONFIG_FILE_NAME: &str = ".utr.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No settings file, or the file lacks the instance's section.
    #[error(
        "settings section [{section}] not found{}",
        .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default()
    )]
    MissingConfiguration {
        section: String,
        path: Option<PathBuf>,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid [{section}] section: {source}")]
    InvalidSection {
        section: String,
        source: toml::de::Error,
    },

    #[error("test_root is not set and no workspace folder is available")]
    NoTestRoot,
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingConfiguration { .. } => ErrorCode::ConfigMissing,
            Self::Read { .. } => ErrorCode::ConfigReadError,
            Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::InvalidSection { .. } => ErrorCode::ConfigInvalidSection,
            Self::NoTestRoot => ErrorCode::ConfigNoTestRoot,
        }
    }
}

/// Locate the settings file.
///
/// An explicit path always wins, even if it does not exist (reading it will
/// then fail with a clear error).
pub fn find_config_file(explicit: Option<&Path>, start_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Found settings file {}", candidate.display());
            return Some(candidate);
        }
    }

    let user_config = dirs::config_dir()?.join("utr").join("config.toml");
    user_config.is_file().then_some(user_config)
}

/// Settings for one instance plus where each value came from.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub instance: ToolInstance,
    pub path: PathBuf,
    pub settings: RunnerSettings,
    file_keys: BTreeSet<String>,
    env_overrides: BTreeMap<&'static str, String>,
}

/// Read and parse the instance's section from `path`.
pub fn load_settings(path: Option<&Path>, instance: ToolInstance) -> Result<LoadedSettings, ConfigError> {
    let Some(path) = path else {
        return Err(ConfigError::MissingConfiguration {
            section: instance.settings_section().to_string(),
            path: None,
        });
    };

    // Relative roots inside the file resolve against its absolute location.
    let path = std::path::absolute(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content, &path, instance)
}

/// Parse the instance's section out of settings file `content`.
pub fn parse_settings(
    content: &str,
    path: &Path,
    instance: ToolInstance,
) -> Result<LoadedSettings, ConfigError> {
    let section = instance.settings_section();
    let table = toml::from_str::<toml::Table>(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(value) = table.get(section) else {
        return Err(ConfigError::MissingConfiguration {
            section: section.to_string(),
            path: Some(path.to_path_buf()),
        });
    };

    let file_keys = value
        .as_table()
        .map(|t| t.keys().cloned().collect())
        .unwrap_or_default();
    let mut settings = toml::Value::try_into::<RunnerSettings>(value.clone()).map_err(|source| {
        ConfigError::InvalidSection {
            section: section.to_string(),
            source,
        }
    })?;

    // Relative roots are relative to the file that declares them.
    if let (Some(root), Some(dir)) = (&settings.test_root, path.parent())
        && root.is_relative()
    {
        settings.test_root = Some(dir.join(root));
    }

    Ok(LoadedSettings {
        instance,
        path: path.to_path_buf(),
        settings,
        file_keys,
        env_overrides: BTreeMap::new(),
    })
}

/// One line of `utr config` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: ConfigSource,
}

impl LoadedSettings {
    /// Apply `UTR_*` overrides. Invalid values stay in `parser`'s errors.
    pub fn apply_env_overrides(&mut self, parser: &mut EnvParser) {
        if let Some(v) = parser.get_absolute_path("TEST_ROOT") {
            self.record_env("test_root", &v.source);
            self.settings.test_root = Some(v.value);
        }
        if let Some(v) = parser.get_list("PROJECT_ROOTS") {
            self.record_env("project_roots", &v.source);
            self.settings.project_roots = v.value;
        }
        if let Some(v) = parser.get_bool("USE_PROJECT_ROOT") {
            self.record_env("use_project_root", &v.source);
            self.settings.use_project_root = v.value;
        }
        if let Some(v) = parser.get_string("TEST_COMMAND") {
            self.record_env("test_command", &v.source);
            self.settings.test_command = v.value;
        }
        if let Some(v) = parser.get_string("BEFORE_TEST") {
            self.record_env("before_test", &v.source);
            self.settings.before_test = Some(v.value);
        }
        if let Some(v) = parser.get_string("AFTER_TEST") {
            self.record_env("after_test", &v.source);
            self.settings.after_test = Some(v.value);
        }
        if let Some(v) = parser.get_string("TEST_DELIMITER") {
            self.record_env("test_delimiter", &v.source);
            self.settings.test_delimiter = v.value;
        }
        if let Some(v) = parser.get_bool("SHOW_COLOR") {
            self.record_env("show_color", &v.source);
            self.settings.show_color = v.value;
        }
    }

    fn record_env(&mut self, key: &'static str, source: &ConfigSource) {
        if let ConfigSource::Env(var) = source {
            self.env_overrides.insert(key, var.clone());
        }
    }

    /// Where `key` got its effective value.
    pub fn source_of(&self, key: &str) -> ConfigSource {
        if let Some(var) = self.env_overrides.get(key) {
            return ConfigSource::Env(var.clone());
        }
        let in_file = self.file_keys.contains(key)
            || (key == "test_delimiter" && self.file_keys.contains("test_delimeter"));
        if in_file {
            ConfigSource::File(self.path.clone())
        } else {
            ConfigSource::Default
        }
    }

    /// Effective values with their sources.
    pub fn report(&self, workspace_folders: &[PathBuf]) -> Vec<ConfigEntry> {
        let s = &self.settings;
        let (test_root, test_root_source) = match (&s.test_root, workspace_folders.first()) {
            (Some(root), _) => (root.display().to_string(), self.source_of("test_root")),
            (None, Some(folder)) => (folder.display().to_string(), ConfigSource::Workspace),
            (None, None) => ("<unset>".to_string(), ConfigSource::Default),
        };
        let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "<unset>".to_string());

        vec![
            ConfigEntry {
                key: "test_root",
                value: test_root,
                source: test_root_source,
            },
            self.entry("project_roots", format!("{:?}", s.project_roots)),
            self.entry("use_project_root", s.use_project_root.to_string()),
            self.entry("test_command", format!("{:?}", s.test_command)),
            self.entry("before_test", optional(&s.before_test)),
            self.entry("after_test", optional(&s.after_test)),
            self.entry("test_delimiter", format!("{:?}", s.test_delimiter)),
            self.entry("show_color", s.show_color.to_string()),
            self.entry("source_extensions", format!("{:?}", s.source_extensions)),
        ]
    }

    fn entry(&self, key: &'static str, value: String) -> ConfigEntry {
        ConfigEntry {
            key,
            value,
            source: self.source_of(key),
        }
    }
}
