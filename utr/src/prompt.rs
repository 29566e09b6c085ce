//! Terminal prompts answering workflow requests.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use utr_common::{PromptKind, Response};

use crate::error::CliError;

/// Show the prompt described by `kind` and wait for the user's answer.
///
/// Runs on the blocking pool; the terminal is read synchronously.
pub async fn ask(kind: PromptKind) -> Result<Response, CliError> {
    // dialoguer draws on and reads through stderr's terminal.
    if !console::Term::stderr().is_term() {
        return Err(CliError::NotInteractive);
    }
    tokio::task::spawn_blocking(move || ask_blocking(&kind))
        .await
        .map_err(|e| CliError::Prompt(e.to_string()))?
}

fn ask_blocking(kind: &PromptKind) -> Result<Response, CliError> {
    let theme = ColorfulTheme::default();
    match kind {
        PromptKind::Select { items } => {
            let labels: Vec<&str> = items.iter().map(|c| c.as_str()).collect();
            let choice = Select::with_theme(&theme)
                .with_prompt("Select a test to run (Esc to cancel)")
                .items(&labels)
                .default(0)
                .interact_opt()
                .map_err(|e| CliError::Prompt(e.to_string()))?;
            Ok(choice.map_or(Response::Cancelled, Response::Selected))
        }
        PromptKind::ManualEntry { message, default } => {
            let entered: String = Input::with_theme(&theme)
                .with_prompt(message)
                .with_initial_text(default)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| CliError::Prompt(e.to_string()))?;
            Ok(entry_response(entered))
        }
    }
}

/// A blank entry is a cancellation.
fn entry_response(entered: String) -> Response {
    if entered.trim().is_empty() {
        Response::Cancelled
    } else {
        Response::Entered(entered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_entry_cancels() {
        assert_eq!(entry_response("   ".to_string()), Response::Cancelled);
        assert_eq!(
            entry_response("nosetests pkg".to_string()),
            Response::Entered("nosetests pkg".to_string())
        );
    }
}
