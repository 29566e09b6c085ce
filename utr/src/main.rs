//! Unit Test Runner
//!
//! Finds the unit tests belonging to a source file, lets you pick one and
//! runs it through the shell from the project's test root. The last command
//! is remembered so it can be re-run from anywhere.

#![forbid(unsafe_code)]

mod commands;
mod error;
mod exec;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use utr_common::{EnvParser, ToolInstance};

use crate::commands::GlobalOptions;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "utr")]
#[command(
    author,
    version,
    about = "Unit Test Runner - find, pick and run the tests for the file you are editing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: nearest .utr.toml, then the user config dir)
    #[arg(long, global = true, env = "UTR_CONFIG")]
    config: Option<PathBuf>,

    /// Workspace folder; the first one is the default test root
    #[arg(long = "folder", global = true)]
    folders: Vec<PathBuf>,

    /// Tool instance: python or generic. Each has its own settings and last run
    #[arg(long, global = true, default_value = "python")]
    instance: ToolInstance,

    /// Directory holding the last-run stores
    #[arg(long, global = true, env = "UTR_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the tests for FILE, pick one and run it
    Find {
        /// Source file being edited
        file: PathBuf,
    },

    /// Run the test module FILE translates to
    Run {
        /// Test file to run
        file: PathBuf,

        /// Only run the last test method declared in FILE
        #[arg(long)]
        focus: bool,
    },

    /// Run the last test command again
    Last,

    /// Type a test command and run it with the configured hooks
    Custom,

    /// List the commands `find` would offer, without running anything
    Candidates {
        /// Source file being edited
        file: PathBuf,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show effective settings and where each value comes from
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        error::report(&e.into());
        return ExitCode::FAILURE;
    }

    let options = GlobalOptions {
        config: cli.config,
        folders: cli.folders,
        instance: cli.instance,
        state_dir: cli.state_dir,
    };

    match dispatch(cli.command, &options).await {
        Ok(code) => code,
        Err(e) => {
            error::report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands, options: &GlobalOptions) -> Result<ExitCode> {
    match command {
        Commands::Find { file } => commands::find(options, &file).await,
        Commands::Run { file, focus } => commands::run(options, &file, focus).await,
        Commands::Last => commands::last(options).await,
        Commands::Custom => commands::custom(options).await,
        Commands::Candidates { file, json } => commands::candidates(options, &file, json),
        Commands::Config { json } => commands::config(options, json),
    }
}

/// Logs go to stderr so command output on stdout stays clean.
///
/// Filter from `UTR_LOG`, then `RUST_LOG`, default `warn`; `-v` forces
/// debug. `UTR_LOG_FORMAT=json` switches to JSON lines.
fn init_logging(verbose: bool) -> Result<(), CliError> {
    let filter = if verbose {
        EnvFilter::new("utr=debug,utr_common=debug")
    } else {
        EnvFilter::try_from_env("UTR_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let json = EnvParser::new()
        .get_string("LOG_FORMAT")
        .is_some_and(|format| format.value.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}
