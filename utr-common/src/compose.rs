//! Test command composition.

use thiserror::Error;

use crate::errors::ErrorCode;
use crate::path_translate::TestTarget;
use crate::signature::TestSelector;
use crate::types::{Candidate, ResolutionContext};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// Nothing runnable was produced.
    #[error("no candidate: composed command is blank")]
    NoCandidate,
}

impl ComposeError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ResolveBlankCommand
    }
}

/// `test_command + target`, wrapped in the configured hooks.
pub fn compose(context: &ResolutionContext, target: &TestTarget) -> Result<Candidate, ComposeError> {
    compose_with_selector(context, target, None)
}

/// Like [`compose`], appending a rendered selector to the target.
pub fn compose_with_selector(
    context: &ResolutionContext,
    target: &TestTarget,
    selector: Option<&TestSelector>,
) -> Result<Candidate, ComposeError> {
    let mut command = format!("{}{}", context.test_command(), target.as_str());
    if let Some(selector) = selector {
        command.push_str(&selector.render(context.delimiter()));
    }
    wrap_hooks(context, &command)
}

/// Chain the before/after hooks around an already complete command.
pub fn wrap_hooks(context: &ResolutionContext, command: &str) -> Result<Candidate, ComposeError> {
    if command.trim().is_empty() {
        return Err(ComposeError::NoCandidate);
    }

    let chain = context.chain().token();
    let mut composed = command.to_string();
    if let Some(before) = context.before_hook() {
        composed = format!("{before}{chain}{composed}");
    }
    if let Some(after) = context.after_hook() {
        composed = format!("{composed}{chain}{after}");
    }

    Candidate::new(composed).ok_or(ComposeError::NoCandidate)
}
