//! `btb` - run commands with a persistent log, retries and
//! permission-normalizing file helpers

use anyhow::{Context, Result};
use btb_config::{Config, FileOpsKind};
use clap::{Parser, Subcommand};
use command_runner::{FileHelper, LogContext, Runner};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "btb")]
#[command(about = "Run commands with logging, retries and permission-normalizing file helpers")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = btb_config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Use native file APIs instead of shelling out to cp and chmod
    #[arg(long, global = true)]
    native: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command, logging its output
    Run {
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Stream output to the terminal instead of the log file
        #[arg(long)]
        stream: bool,
        /// Message printed before the command runs
        #[arg(short, long)]
        message: Option<String>,
        /// Message logged as an error if the command fails
        #[arg(long)]
        on_failure: Option<String>,
        /// The command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a command and print its captured output
    Check {
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// The command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Run a command, retrying on failure
    Retry {
        /// Extra attempts after the first failure (defaults to the config value)
        #[arg(short, long)]
        retries: Option<u32>,
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// The command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print a command the way it appears in the log
    Pretty {
        /// The command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    #[command(flatten)]
    Fs(commands::fs::FsCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let log = LogContext::with_level(config.log.file_or_default(), config.log.level_or_default()?)
        .context("Failed to open log file")?;
    let runner = Runner::new(log).with_tail_lines(config.run.tail_lines);

    match cli.command {
        Commands::Run {
            cwd,
            stream,
            message,
            on_failure,
            command,
        } => commands::run::run(&runner, command, cwd, stream, message, on_failure),
        Commands::Check { cwd, command } => commands::run::check(&runner, command, cwd),
        Commands::Retry {
            retries,
            cwd,
            command,
        } => commands::run::retry(&runner, command, cwd, retries.unwrap_or(config.run.retries)),
        Commands::Pretty { command } => {
            println!("{}", command_runner::pretty_string_cmd(&command));
            Ok(())
        }
        Commands::Fs(fs_command) => {
            if cli.native || config.run.file_ops == FileOpsKind::Native {
                commands::fs::run(&FileHelper::native(runner.log().clone()), fs_command)
            } else {
                commands::fs::run(&FileHelper::shell(runner), fs_command)
            }
        }
    }
}
