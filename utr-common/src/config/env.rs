//! Environment variable parsing with type safety.
//!
//! Provides a type-safe parser for UTR environment variables with
//! validation, error collection, and source tracking.

use super::source::Sourced;
use crate::errors::ErrorCode;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Path must be absolute.
    #[error("Path for {var} must be absolute: {}", path.display())]
    RelativePath { var: String, path: PathBuf },
}

impl EnvError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ConfigEnvError
    }
}

/// Type-safe environment variable parser.
///
/// Collects errors during parsing so all issues can be reported at once.
/// Unset variables yield `None`; the caller keeps its own value.
pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a new parser with the UTR_ prefix.
    pub fn new() -> Self {
        Self {
            prefix: "UTR_",
            errors: Vec::new(),
        }
    }

    /// Take ownership of errors.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    /// Get the full variable name with prefix.
    pub fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Get a string value.
    pub fn get_string(&mut self, name: &str) -> Option<Sourced<String>> {
        let var_name = self.var_name(name);
        env::var(&var_name)
            .ok()
            .map(|value| Sourced::from_env(value, var_name))
    }

    /// Get a boolean value.
    ///
    /// Accepts: 1, true, yes, on (for true)
    ///          0, false, no, off, "" (for false)
    pub fn get_bool(&mut self, name: &str) -> Option<Sourced<bool>> {
        let var_name = self.var_name(name);
        let value = env::var(&var_name).ok()?;
        let parsed = match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" | "" => false,
            _ => {
                self.errors.push(EnvError::InvalidValue {
                    var: var_name,
                    expected: "boolean (true/false/1/0/yes/no)".to_string(),
                    value,
                });
                return None;
            }
        };
        Some(Sourced::from_env(parsed, var_name))
    }

    /// Get an absolute path.
    pub fn get_absolute_path(&mut self, name: &str) -> Option<Sourced<PathBuf>> {
        let var_name = self.var_name(name);
        let value = env::var(&var_name).ok()?;
        let path = PathBuf::from(value);
        if !path.is_absolute() {
            self.errors.push(EnvError::RelativePath {
                var: var_name,
                path,
            });
            return None;
        }
        Some(Sourced::from_env(path, var_name))
    }

    /// Get a comma-separated list; blank entries are dropped.
    pub fn get_list(&mut self, name: &str) -> Option<Sourced<Vec<String>>> {
        let var_name = self.var_name(name);
        let value = env::var(&var_name).ok()?;
        let items = value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        Some(Sourced::from_env(items, var_name))
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::source::ConfigSource;
    use serial_test::serial;

    fn set(name: &str, value: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { env::set_var(name, value) };
    }

    fn unset(name: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { env::remove_var(name) };
    }

    #[test]
    #[serial]
    fn test_unset_variable_is_none() {
        unset("UTR_TEST_ENV_UNSET");
        let mut parser = EnvParser::new();
        assert!(parser.get_string("TEST_ENV_UNSET").is_none());
        assert!(parser.get_bool("TEST_ENV_UNSET").is_none());
        assert!(parser.take_errors().is_empty());
    }

    #[test]
    #[serial]
    fn test_bool_parsing() {
        let mut parser = EnvParser::new();
        for (raw, expected) in [("yes", true), ("ON", true), ("0", false), ("", false)] {
            set("UTR_TEST_ENV_BOOL", raw);
            let parsed = parser.get_bool("TEST_ENV_BOOL").expect("set");
            assert_eq!(parsed.value, expected, "raw value {raw:?}");
            assert_eq!(parsed.source, ConfigSource::Env("UTR_TEST_ENV_BOOL".to_string()));
        }
        unset("UTR_TEST_ENV_BOOL");
        assert!(parser.take_errors().is_empty());
    }

    #[test]
    #[serial]
    fn test_invalid_bool_is_collected() {
        set("UTR_TEST_ENV_BAD", "maybe");
        let mut parser = EnvParser::new();
        assert!(parser.get_bool("TEST_ENV_BAD").is_none());
        let errors = parser.take_errors();
        unset("UTR_TEST_ENV_BAD");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("UTR_TEST_ENV_BAD"));
        assert!(parser.take_errors().is_empty());
    }

    #[test]
    #[serial]
    fn test_relative_path_is_rejected() {
        set("UTR_TEST_ENV_ROOT", "relative/dir");
        let mut parser = EnvParser::new();
        assert!(parser.get_absolute_path("TEST_ENV_ROOT").is_none());
        assert!(matches!(parser.take_errors()[..], [EnvError::RelativePath { .. }]));
        unset("UTR_TEST_ENV_ROOT");
    }

    #[test]
    #[serial]
    fn test_list_parsing() {
        set("UTR_TEST_ENV_LIST", "src, lib/core,, ");
        let mut parser = EnvParser::new();
        let list = parser.get_list("TEST_ENV_LIST").expect("set");
        unset("UTR_TEST_ENV_LIST");
        assert_eq!(list.value, vec!["src".to_string(), "lib/core".to_string()]);
    }
}
