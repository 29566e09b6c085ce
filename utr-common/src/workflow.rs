//! Candidate selection workflow.
//!
//! A [`SelectionWorkflow`] never blocks on the user. Each call returns a
//! [`Step`]: either a prompt or execution request for the host to fulfil,
//! or the final outcome. The host answers with [`SelectionWorkflow::resume`],
//! quoting the [`ContinuationToken`] of the request it is answering.
//! Answers with any other token are ignored.
//!
//! ```text
//! Idle -> Discovering -> AwaitingUserSelection -> Composed -> Executed
//!              \-> NoCandidates -> AwaitingManualEntry -/
//! ```
//!
//! Cancelling either prompt returns the workflow to `Idle` with nothing
//! executed and nothing remembered.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::compose::wrap_hooks;
use crate::discovery::discover;
use crate::run_memory::RunMemory;
use crate::types::{Candidate, ResolutionContext};
use crate::util::mask_sensitive_command;

/// Workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Discovering,
    AwaitingUserSelection,
    NoCandidates,
    AwaitingManualEntry,
    Composed,
    Executed,
}

/// Identifies one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContinuationToken(Uuid);

impl ContinuationToken {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    /// Pick one of the listed commands.
    Select { items: Vec<Candidate> },
    /// Type a command, starting from `default`.
    ManualEntry { message: String, default: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub token: ContinuationToken,
    pub kind: PromptKind,
}

/// Run `command` through the shell in `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub token: ContinuationToken,
    pub command: Candidate,
    pub working_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command was handed to the host and remembered.
    Executed(Candidate),
    /// The user backed out; nothing ran.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Prompt(PromptRequest),
    Execute(ExecutionRequest),
    Finished(Outcome),
    /// The response did not match the outstanding request.
    Ignored,
}

/// Host answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Index into the `Select` items.
    Selected(usize),
    Entered(String),
    Cancelled,
    /// The host attempted the execution request, whatever its exit status.
    Attempted,
}

#[derive(Debug, Clone)]
enum Mode {
    /// Discovery from the source file, manual entry taken verbatim.
    Find { source_file: PathBuf },
    /// Manual entry only, wrapped with the configured hooks.
    Custom,
    /// A command already known.
    Direct { command: Candidate },
}

/// One invocation of the selection workflow with its own captured context.
#[derive(Debug)]
pub struct SelectionWorkflow {
    context: ResolutionContext,
    mode: Mode,
    state: WorkflowState,
    pending: Option<ContinuationToken>,
    items: Vec<Candidate>,
    command: Option<Candidate>,
}

impl SelectionWorkflow {
    fn with_mode(context: ResolutionContext, mode: Mode) -> Self {
        Self {
            context,
            mode,
            state: WorkflowState::Idle,
            pending: None,
            items: Vec::new(),
            command: None,
        }
    }

    /// Discover tests for `source_file` and let the user pick one.
    pub fn find(context: ResolutionContext, source_file: impl Into<PathBuf>) -> Self {
        Self::with_mode(
            context,
            Mode::Find {
                source_file: source_file.into(),
            },
        )
    }

    /// Ask for a command pre-filled with the test command, then wrap it in
    /// the hooks.
    pub fn custom(context: ResolutionContext) -> Self {
        Self::with_mode(context, Mode::Custom)
    }

    /// Execute a known command without prompting.
    pub fn direct(context: ResolutionContext, command: Candidate) -> Self {
        Self::with_mode(context, Mode::Direct { command })
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Leave `Idle`. Reads `memory` once for the find flow.
    ///
    /// Calling `start` again after the workflow has left `Idle` is ignored.
    pub fn start(&mut self, memory: &RunMemory) -> Step {
        if self.state != WorkflowState::Idle || self.pending.is_some() {
            debug!("Workflow already started in state {:?}", self.state);
            return Step::Ignored;
        }

        match self.mode.clone() {
            Mode::Find { source_file } => {
                self.state = WorkflowState::Discovering;
                let candidates = gather_candidates(&self.context, memory, &source_file);
                if candidates.is_empty() {
                    self.state = WorkflowState::NoCandidates;
                    info!("No unit tests found for {}", source_file.display());
                    self.request_manual_entry("No test found. Enter a test command:")
                } else {
                    self.items = candidates;
                    self.request_selection()
                }
            }
            Mode::Custom => self.request_manual_entry("Enter a test command:"),
            Mode::Direct { command } => self.compose(command),
        }
    }

    /// Deliver the host's answer to the request identified by `token`.
    ///
    /// `memory` is written once, when an execution attempt is acknowledged.
    pub fn resume(&mut self, memory: &mut RunMemory, token: ContinuationToken, response: Response) -> Step {
        if self.pending != Some(token) {
            debug!("Ignoring response for stale token {}", token);
            return Step::Ignored;
        }

        match (self.state, response) {
            (WorkflowState::AwaitingUserSelection, Response::Selected(index)) => {
                self.pending = None;
                match self.items.get(index).cloned() {
                    Some(command) => self.compose(command),
                    None => {
                        warn!("Selection {} out of range ({} candidates)", index, self.items.len());
                        self.cancel()
                    }
                }
            }
            (WorkflowState::AwaitingManualEntry, Response::Entered(text)) => {
                self.pending = None;
                match self.manual_command(&text) {
                    Some(command) => self.compose(command),
                    None => self.cancel(),
                }
            }
            (WorkflowState::AwaitingUserSelection | WorkflowState::AwaitingManualEntry, Response::Cancelled) => {
                self.pending = None;
                self.cancel()
            }
            (WorkflowState::Composed, Response::Attempted) => {
                self.pending = None;
                let Some(command) = self.command.clone() else {
                    return self.cancel();
                };
                if let Err(e) = memory.remember(command.as_str()) {
                    warn!("Failed to remember last run: {}", e);
                }
                self.state = WorkflowState::Executed;
                Step::Finished(Outcome::Executed(command))
            }
            (state, response) => {
                debug!("Ignoring {:?} while in state {:?}", response, state);
                Step::Ignored
            }
        }
    }

    fn request_selection(&mut self) -> Step {
        let token = ContinuationToken::fresh();
        self.pending = Some(token);
        self.state = WorkflowState::AwaitingUserSelection;
        Step::Prompt(PromptRequest {
            token,
            kind: PromptKind::Select {
                items: self.items.clone(),
            },
        })
    }

    fn request_manual_entry(&mut self, message: &str) -> Step {
        let token = ContinuationToken::fresh();
        self.pending = Some(token);
        self.state = WorkflowState::AwaitingManualEntry;
        Step::Prompt(PromptRequest {
            token,
            kind: PromptKind::ManualEntry {
                message: message.to_string(),
                default: self.context.test_command().to_string(),
            },
        })
    }

    fn manual_command(&self, text: &str) -> Option<Candidate> {
        if text.trim().is_empty() {
            return None;
        }
        match self.mode {
            Mode::Custom => match wrap_hooks(&self.context, text.trim()) {
                Ok(command) => Some(command),
                Err(e) => {
                    debug!("Discarding manual entry: {}", e);
                    None
                }
            },
            _ => Candidate::new(text),
        }
    }

    fn compose(&mut self, command: Candidate) -> Step {
        info!("Running: {}", mask_sensitive_command(command.as_str()));
        let token = ContinuationToken::fresh();
        self.pending = Some(token);
        self.state = WorkflowState::Composed;
        self.command = Some(command.clone());
        Step::Execute(ExecutionRequest {
            token,
            command,
            working_dir: self.context.test_root().to_path_buf(),
        })
    }

    fn cancel(&mut self) -> Step {
        debug!("Workflow cancelled");
        self.state = WorkflowState::Idle;
        self.pending = None;
        self.items.clear();
        self.command = None;
        Step::Finished(Outcome::Cancelled)
    }
}

/// Last run first, then discovered candidates, without duplicates.
pub fn merge_candidates(last_run: Option<&str>, discovered: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    last_run
        .and_then(Candidate::new)
        .into_iter()
        .chain(discovered)
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

/// The list offered by the find flow, without prompting.
pub fn gather_candidates(context: &ResolutionContext, memory: &RunMemory, source_file: &Path) -> Vec<Candidate> {
    let last_run = memory.last_run();
    merge_candidates(last_run.as_deref(), discover(context, source_file))
}
