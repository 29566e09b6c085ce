//! Core of the UTR unit test runner.
//!
//! Turns a source file into runnable test commands: conventional test-file
//! discovery, path-to-module translation, selector extraction from test
//! source, command composition with hooks, and last-run memory. The
//! [`workflow`] module ties these together behind a prompt-free state
//! machine that the `utr` binary drives.

pub mod compose;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod path_translate;
pub mod run_memory;
pub mod signature;
pub mod types;
pub mod util;
pub mod workflow;

pub use compose::{ComposeError, compose, compose_with_selector, wrap_hooks};
pub use config::{
    ConfigEntry, ConfigError, ConfigSource, EnvError, EnvParser, LoadedSettings, Sourced,
    find_config_file, load_settings,
};
pub use discovery::{candidate_test_paths, discover};
pub use errors::{ErrorCategory, ErrorCode, ErrorEntry};
pub use path_translate::{TestTarget, TranslateError, resolve_target, translate};
pub use run_memory::{FileRunStore, InMemoryRunStore, LAST_RUN_KEY, RunMemory, RunStore, RunStoreError};
pub use signature::{TestSelector, extract_selector};
pub use types::{
    Candidate, ChainSeparator, DEFAULT_TEST_COMMAND, DEFAULT_TEST_DELIMITER, ResolutionContext,
    RunnerSettings, ToolInstance,
};
pub use util::mask_sensitive_command;
pub use workflow::{
    ContinuationToken, ExecutionRequest, Outcome, PromptKind, PromptRequest, Response,
    SelectionWorkflow, Step, WorkflowState, gather_candidates, merge_candidates,
};
