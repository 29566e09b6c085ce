//! Translation of source-file paths into dotted test-module identifiers.
//!
//! Test runners such as nose and unittest address tests by module path
//! (`pkg.sub.test_mod`) relative to the directory they import from. This
//! module turns an absolute file path into that form and, when project
//! roots are declared, picks the package root the file belongs to.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::errors::ErrorCode;
use crate::types::ResolutionContext;

/// Why a path could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("{} is not under {}", file.display(), root.display())]
    OutsideRoot { root: PathBuf, file: PathBuf },

    #[error("{} has no recognized source extension (expected one of: {})", file.display(), .expected.join(", "))]
    NotASourceFile { file: PathBuf, expected: Vec<String> },

    #[error("{} is not valid UTF-8", file.display())]
    NonUtf8Path { file: PathBuf },
}

impl TranslateError {
    /// Catalog code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutsideRoot { .. } => ErrorCode::ResolveOutsideRoot,
            Self::NotASourceFile { .. } => ErrorCode::ResolveNotASourceFile,
            Self::NonUtf8Path { .. } => ErrorCode::ResolveNonUtf8Path,
        }
    }
}

/// What a test command is pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestTarget {
    /// Dotted module identifier, possibly with a selector suffix.
    Module(String),
    /// Path used verbatim because no project root applies.
    RawPath(String),
}

impl TestTarget {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Module(s) | Self::RawPath(s) => s,
        }
    }
}

impl fmt::Display for TestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate `file` into a dotted identifier relative to `root`.
///
/// Separators become `.` and exactly one trailing source extension from
/// `extensions` is removed. Both paths are normalized lexically first; the
/// filesystem is never consulted.
pub fn translate(root: &Path, file: &Path, extensions: &[String]) -> Result<String, TranslateError> {
    let root = normalize_lexically(root);
    let normalized = normalize_lexically(file);

    let outside = || TranslateError::OutsideRoot {
        root: root.clone(),
        file: file.to_path_buf(),
    };
    let relative = normalized.strip_prefix(&root).map_err(|_| outside())?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| TranslateError::NonUtf8Path {
                    file: file.to_path_buf(),
                })?;
                segments.push(part);
            }
            _ => return Err(outside()),
        }
    }

    let not_source = || TranslateError::NotASourceFile {
        file: file.to_path_buf(),
        expected: extensions.to_vec(),
    };
    let (file_name, packages) = segments.split_last().ok_or_else(not_source)?;
    let module = strip_source_extension(file_name, extensions).ok_or_else(not_source)?;

    let mut dotted = packages.join(".");
    if !dotted.is_empty() {
        dotted.push('.');
    }
    dotted.push_str(module);
    Ok(dotted)
}

fn strip_source_extension<'a>(file_name: &'a str, extensions: &[String]) -> Option<&'a str> {
    extensions
        .iter()
        .filter_map(|ext| {
            let ext = ext.trim_start_matches('.');
            if ext.is_empty() {
                return None;
            }
            file_name.strip_suffix(ext)?.strip_suffix('.')
        })
        .find(|stem| !stem.is_empty())
}

/// Resolve the target for a discovered test file.
///
/// With project-root remapping enabled, the first declared root (joined
/// onto the test root) that contains `file` is used as translation root.
/// Otherwise, or when no root matches, the path itself is the target.
pub fn resolve_target(context: &ResolutionContext, file: &Path) -> Result<TestTarget, TranslateError> {
    if !context.use_project_root() || context.project_roots().is_empty() {
        return Ok(TestTarget::RawPath(file.display().to_string()));
    }

    let file = normalize_lexically(file);
    let test_root = normalize_lexically(context.test_root());

    for declared in context.project_roots() {
        let candidate_root = normalize_lexically(&test_root.join(declared_root_path(declared)));
        debug!(
            "Testing project root {} for {}",
            candidate_root.display(),
            file.display()
        );
        if file.starts_with(&candidate_root) {
            debug!("Project root matched: {}", candidate_root.display());
            return translate(&candidate_root, &file, context.source_extensions())
                .map(TestTarget::Module);
        }
    }

    debug!("No project root matched {}, using raw path", file.display());
    Ok(TestTarget::RawPath(file.display().to_string()))
}

/// Declared roots are written with `/` regardless of host. A leading `/`
/// keeps the root absolute, so joining it replaces the test root.
fn declared_root_path(declared: &str) -> PathBuf {
    let parts = declared.split('/').filter(|part| !part.is_empty());
    if declared.starts_with('/') {
        std::iter::once(Component::RootDir.as_os_str()).chain(parts.map(OsStr::new)).collect()
    } else {
        parts.collect()
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
