//! Subcommand implementations.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use utr_common::path_translate::normalize_lexically;
use utr_common::{
    Candidate, EnvParser, FileRunStore, LoadedSettings, Outcome, ResolutionContext, Response,
    RunMemory, SelectionWorkflow, Step, TestTarget, ToolInstance, compose_with_selector,
    extract_selector, find_config_file, gather_candidates, load_settings, resolve_target, translate,
};

use crate::error::CliError;
use crate::{exec, prompt};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub folders: Vec<PathBuf>,
    pub instance: ToolInstance,
    pub state_dir: Option<PathBuf>,
}

/// Resolution context and last-run memory for one invocation.
pub struct Session {
    pub context: ResolutionContext,
    pub memory: RunMemory,
}

impl Session {
    pub fn load(options: &GlobalOptions) -> Result<Self> {
        let loaded = load_config(options)?;
        let folders = workspace_folders(options)?;
        let context = ResolutionContext::from_settings(&loaded.settings, &folders)
            .context("failed to build resolution context")?;
        let store = FileRunStore::for_instance(options.state_dir.as_deref(), options.instance)?;
        debug!("Last-run store: {}", store.path().display());

        colored::control::set_override(loaded.settings.show_color);

        Ok(Self {
            context,
            memory: RunMemory::new(store),
        })
    }
}

fn workspace_folders(options: &GlobalOptions) -> Result<Vec<PathBuf>> {
    if options.folders.is_empty() {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        return Ok(vec![cwd]);
    }
    options.folders.iter().map(|f| absolute(f)).collect()
}

/// Settings for the selected instance with `UTR_*` overrides applied.
pub fn load_config(options: &GlobalOptions) -> Result<LoadedSettings> {
    let folders = workspace_folders(options)?;
    let start = folders.first().cloned().unwrap_or_else(|| PathBuf::from("."));
    let path = find_config_file(options.config.as_deref(), &start);
    let mut loaded = load_settings(path.as_deref(), options.instance)?;
    info!(
        "Loaded [{}] from {}",
        options.instance.settings_section(),
        loaded.path.display()
    );

    let mut parser = EnvParser::new();
    loaded.apply_env_overrides(&mut parser);
    for err in parser.take_errors() {
        warn!("[{}] Ignoring environment override: {}", err.code().code_string(), err);
    }
    Ok(loaded)
}

/// Absolute, lexically normalized form of a command-line path.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Ok(normalize_lexically(&path))
}

/// `utr find`: discover, pick, run.
pub async fn find(options: &GlobalOptions, file: &Path) -> Result<ExitCode> {
    let mut session = Session::load(options)?;
    let file = absolute(file)?;
    let workflow = SelectionWorkflow::find(session.context.clone(), file);
    drive(workflow, &mut session.memory).await
}

/// `utr run`: the module for `file`, optionally focused on its last test.
pub async fn run(options: &GlobalOptions, file: &Path, focus: bool) -> Result<ExitCode> {
    let mut session = Session::load(options)?;
    let file = absolute(file)?;
    let command = module_command(&session.context, &file, focus).await?;
    let workflow = SelectionWorkflow::direct(session.context.clone(), command);
    drive(workflow, &mut session.memory).await
}

/// Command running the module `file` translates to.
///
/// A matching project root wins; otherwise the path is taken relative to
/// `test_root`.
pub async fn module_command(context: &ResolutionContext, file: &Path, focus: bool) -> Result<Candidate> {
    let target = match resolve_target(context, file)? {
        TestTarget::RawPath(_) => TestTarget::Module(translate(
            context.test_root(),
            file,
            context.source_extensions(),
        )?),
        module => module,
    };
    let selector = if focus {
        let source = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        let selector = extract_selector(&source);
        if selector.is_none() {
            info!("No test selector found in {}", file.display());
        }
        selector
    } else {
        None
    };
    Ok(compose_with_selector(context, &target, selector.as_ref())?)
}

/// `utr last`: run the remembered command again.
pub async fn last(options: &GlobalOptions) -> Result<ExitCode> {
    let mut session = Session::load(options)?;
    let command = session
        .memory
        .last_run()
        .and_then(Candidate::new)
        .ok_or(CliError::NoLastRun)?;
    let workflow = SelectionWorkflow::direct(session.context.clone(), command);
    drive(workflow, &mut session.memory).await
}

/// `utr custom`: type a command, wrapped in the hooks.
pub async fn custom(options: &GlobalOptions) -> Result<ExitCode> {
    let mut session = Session::load(options)?;
    let workflow = SelectionWorkflow::custom(session.context.clone());
    drive(workflow, &mut session.memory).await
}

/// `utr candidates`: print what `find` would offer.
pub fn candidates(options: &GlobalOptions, file: &Path, json: bool) -> Result<ExitCode> {
    let session = Session::load(options)?;
    let file = absolute(file)?;
    let found = gather_candidates(&session.context, &session.memory, &file);

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if found.is_empty() {
        eprintln!("No test found for {}", file.display());
    } else {
        for candidate in &found {
            println!("{candidate}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// `utr config`: effective settings and where they came from.
pub fn config(options: &GlobalOptions, json: bool) -> Result<ExitCode> {
    let loaded = load_config(options)?;
    let folders = workspace_folders(options)?;
    colored::control::set_override(loaded.settings.show_color);
    let entries = loaded.report(&folders);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{} [{}] from {}",
        "Settings".bold(),
        loaded.instance.settings_section(),
        loaded.path.display()
    );
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "  {:<width$}  {}  {}",
            entry.key,
            entry.value,
            format!("({})", entry.source).dimmed(),
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Answer workflow requests until it finishes.
async fn drive(mut workflow: SelectionWorkflow, memory: &mut RunMemory) -> Result<ExitCode> {
    let mut exit = ExitCode::SUCCESS;
    let mut step = workflow.start(memory);
    loop {
        step = match step {
            Step::Prompt(request) => {
                let response = prompt::ask(request.kind).await?;
                workflow.resume(memory, request.token, response)
            }
            Step::Execute(request) => {
                let status = exec::run(&request.command, &request.working_dir).await;
                // The attempt is remembered even when the shell could not start.
                let next = workflow.resume(memory, request.token, Response::Attempted);
                exit = ExitCode::from(exec::exit_code_for(&status?));
                next
            }
            Step::Finished(Outcome::Executed(command)) => {
                debug!("Finished: {}", utr_common::mask_sensitive_command(command.as_str()));
                return Ok(exit);
            }
            Step::Finished(Outcome::Cancelled) => {
                info!("Cancelled");
                return Ok(ExitCode::SUCCESS);
            }
            Step::Ignored => {
                anyhow::bail!("workflow stopped in state {:?}", workflow.state());
            }
        };
    }
}
