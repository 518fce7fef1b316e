//! Command-line interface for repoguard
//!
//! Argument parsing with clap; each subcommand lives in [`commands`] and
//! returns the process exit code.

use crate::config::RepoguardConfig;
use crate::rules::Category;
use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod output;
pub mod progress;

pub use output::Output;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "REPOGUARD_LOG";

/// repoguard - lightweight static security scanning for remote GitHub repositories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print reports and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a repository for secrets, PII and insecure patterns
    Scan(ScanArgs),
    /// Print a repository's file tree and mark scan candidates
    Tree(TreeArgs),
    /// List the active detection rules
    Rules {
        /// Only show rules of this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug, Clone)]
pub struct RemoteArgs {
    /// Repository as owner/name or a GitHub URL
    pub repository: String,

    /// Branch to try; repeat for fallbacks
    #[arg(short, long = "branch", value_name = "BRANCH")]
    pub branches: Vec<String>,

    /// GitHub token (optional for public repositories)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Maximum concurrent content requests
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Maximum number of files to scan
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// File extensions to scan, replacing the configured allowlist
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[command(flatten)]
    pub remote: RemoteArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommands {
    /// Print the merged configuration as TOML
    Show,
    /// Validate the merged configuration
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub async fn run(self) -> Result<u8> {
        let output = Output::new(self.verbose > 0, self.quiet);

        let Some(command) = self.command else {
            // Show help when no command is provided
            Cli::command().print_help()?;
            return Ok(0);
        };

        let config = RepoguardConfig::load_with_custom_config(self.config.as_deref())?;
        match command {
            Commands::Scan(args) => commands::scan::execute(args, config, &output).await,
            Commands::Tree(args) => commands::tree::execute(args, config, &output).await,
            Commands::Rules { category } => commands::rules::execute(category, &config, &output),
            Commands::Config(cmd) => commands::config::execute(cmd, &config, &output),
        }
    }
}

/// Install the tracing subscriber; logs go to stderr
///
/// `REPOGUARD_LOG` (or `RUST_LOG`) wins over the verbosity flags.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "repoguard=debug",
        (false, _) => "repoguard=trace",
    };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
