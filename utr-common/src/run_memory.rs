//! Memory of the last executed test command.
//!
//! The command is kept in a small key-value store under [`LAST_RUN_KEY`].
//! Stores are injected through [`RunStore`] so tests can use
//! [`InMemoryRunStore`] instead of the file-backed store.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ErrorCode;
use crate::types::ToolInstance;

/// Key under which the last command is stored.
pub const LAST_RUN_KEY: &str = "last_test_run";

#[derive(Debug, Error)]
pub enum RunStoreError {
    #[error("could not determine a data directory for the last-run store")]
    NoDataDir,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt last-run store {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl RunStoreError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InternalRunStoreError
    }
}

/// Key-value persistence for string settings.
pub trait RunStore {
    fn get(&self, key: &str) -> Result<Option<String>, RunStoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), RunStoreError>;
}

/// Store kept in process memory only.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunStore {
    values: BTreeMap<String, String>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for InMemoryRunStore {
    fn get(&self, key: &str) -> Result<Option<String>, RunStoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RunStoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object file, rewritten atomically on every `set`.
#[derive(Debug, Clone)]
pub struct FileRunStore {
    path: PathBuf,
}

impl FileRunStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `instance` inside `state_dir`, or `<data_dir>/utr`.
    pub fn for_instance(state_dir: Option<&Path>, instance: ToolInstance) -> Result<Self, RunStoreError> {
        let dir = match state_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::data_dir().ok_or(RunStoreError::NoDataDir)?.join("utr"),
        };
        Ok(Self::new(dir.join(format!("{}.json", instance.store_name()))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, RunStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(RunStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|source| RunStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl RunStore for FileRunStore {
    fn get(&self, key: &str) -> Result<Option<String>, RunStoreError> {
        Ok(self
            .read_map()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RunStoreError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e @ RunStoreError::Corrupt { .. }) => {
                warn!("Replacing unreadable last-run store: {}", e);
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), Value::String(value.to_string()));

        let mut content = serde_json::to_vec_pretty(&map).map_err(|source| RunStoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        content.push(b'\n');
        atomic_write(&self.path, &content)
    }
}

/// Writes content to a file atomically using a temporary file.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), RunStoreError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RunStoreError::Io { path, source }
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_err(parent))?;

    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));
    let mut file = fs::File::create(&temp_path).map_err(io_err(&temp_path))?;
    file.write_all(content).map_err(io_err(&temp_path))?;
    file.sync_all().map_err(io_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        RunStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Last-run memory on top of a [`RunStore`].
pub struct RunMemory {
    store: Box<dyn RunStore>,
}

impl RunMemory {
    pub fn new(store: impl RunStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryRunStore::new())
    }

    /// The last command, if any. Unreadable stores count as empty.
    pub fn last_run(&self) -> Option<String> {
        match self.store.get(LAST_RUN_KEY) {
            Ok(value) => value.filter(|v| !v.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read last run: {}", e);
                None
            }
        }
    }

    /// Overwrite the last command.
    pub fn remember(&mut self, command: &str) -> Result<(), RunStoreError> {
        debug!("Remembering last run");
        self.store.set(LAST_RUN_KEY, command)
    }
}

impl std::fmt::Debug for RunMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunMemory").finish_non_exhaustive()
    }
}
