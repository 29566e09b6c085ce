//! Test-file discovery from naming conventions.
//!
//! Given `pkg/foo.py`, looks for `pkg/<dir>/<prefix>foo.py` over a fixed set
//! of test directory names and filename prefixes, and turns every file that
//! exists into a runnable command.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::compose::compose;
use crate::path_translate::resolve_target;
use crate::types::{Candidate, ResolutionContext};

/// Subdirectories searched next to the source file (`""` is the file's own
/// directory).
pub const CANDIDATE_DIRS: [&str; 7] = ["", "test", "tests", "TEST", "TESTS", "unittest", "unittests"];

/// Prefixes applied to the source file name.
pub const TEST_FILE_PREFIXES: [&str; 4] = ["test", "test_", "unittest", "unittest_"];

/// Every conventional test-file location for `source_file`, in search order.
///
/// Returns nothing for paths without a UTF-8 file name.
pub fn candidate_test_paths(source_file: &Path) -> Vec<PathBuf> {
    let Some(base_name) = source_file.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let dir_name = source_file.parent().unwrap_or_else(|| Path::new(""));

    let mut paths = Vec::with_capacity(CANDIDATE_DIRS.len() * TEST_FILE_PREFIXES.len());
    for candidate_dir in CANDIDATE_DIRS {
        let dir = if candidate_dir.is_empty() {
            dir_name.to_path_buf()
        } else {
            dir_name.join(candidate_dir)
        };
        for prefix in TEST_FILE_PREFIXES {
            paths.push(dir.join(format!("{prefix}{base_name}")));
        }
    }
    paths
}

/// Commands for every conventional test file of `source_file` that exists.
///
/// Files whose target cannot be resolved are skipped; an empty result is
/// not an error.
pub fn discover(context: &ResolutionContext, source_file: &Path) -> Vec<Candidate> {
    debug!("Searching unit tests for {}", source_file.display());

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for path in candidate_test_paths(source_file) {
        debug!("Evaluating: {}", path.display());
        if !path_exists(&path) {
            continue;
        }

        let target = match resolve_target(context, &path) {
            Ok(target) => target,
            Err(e) => {
                debug!("Dropping {}: {}", path.display(), e);
                continue;
            }
        };
        match compose(context, &target) {
            Ok(candidate) => {
                if seen.insert(candidate.clone()) {
                    candidates.push(candidate);
                }
            }
            Err(e) => debug!("Dropping {}: {}", path.display(), e),
        }
    }

    debug!("Discovered {} candidate(s)", candidates.len());
    candidates
}

/// Missing files and IO errors (permissions, broken links) both count as
/// not found.
fn path_exists(path: &Path) -> bool {
    match path.try_exists() {
        Ok(exists) => exists,
        Err(e) => {
            debug!("Cannot check {}: {}", path.display(), e);
            false
        }
    }
}
