//! Test selector extraction from test source text.
//!
//! This is a pattern heuristic over raw text, not a parser. The contract:
//!
//! - the **last** `def test_<word>(` in the text is the method;
//! - among `class <Name>(` declarations, the **last** one whose name
//!   contains `Test` or `test` is the class, otherwise the last class;
//! - no method, or no class at all, means no selector.
//!
//! The last-match rule assumes the most recently written test, usually at
//! the bottom of the file, is the one being worked on.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static METHOD_PATTERN: OnceLock<Regex> = OnceLock::new();
static CLASS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn method_pattern() -> &'static Regex {
    METHOD_PATTERN
        .get_or_init(|| Regex::new(r"\s?def\s+(test_\w+)\s?\(").expect("method pattern is valid"))
}

fn class_pattern() -> &'static Regex {
    CLASS_PATTERN
        .get_or_init(|| Regex::new(r"\s?class\s+(\w+)\s?\(").expect("class pattern is valid"))
}

/// Qualified test method found in a test file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSelector {
    pub class_name: String,
    pub method_name: String,
}

impl TestSelector {
    /// `<delimiter><Class>.<method>`, ready to append to a module path.
    pub fn render(&self, delimiter: &str) -> String {
        format!("{delimiter}{}.{}", self.class_name, self.method_name)
    }
}

impl fmt::Display for TestSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)
    }
}

/// Extract the selector for the most relevant test in `source`.
pub fn extract_selector(source: &str) -> Option<TestSelector> {
    let method_name = find_test_method(source)?;
    let class_name = find_test_class(source)?;
    Some(TestSelector {
        class_name: class_name.to_string(),
        method_name: method_name.to_string(),
    })
}

/// Last `test_*` function name declared in `source`.
pub fn find_test_method(source: &str) -> Option<&str> {
    method_pattern()
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .last()
        .map(|m| m.as_str())
}

/// Most relevant class name declared in `source`.
pub fn find_test_class(source: &str) -> Option<&str> {
    let classes: Vec<&str> = class_pattern()
        .captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    classes
        .iter()
        .rev()
        .find(|name| name.contains("Test") || name.contains("test"))
        .or_else(|| classes.last())
        .copied()
}
