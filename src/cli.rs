// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `junknet`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "junknet",
    version,
    about = "Distribute a graph of build jobs across remote build daemons.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the build description (TOML).
    #[arg(long, value_name = "PATH", default_value = "Junknet.toml")]
    pub jobs: String,

    /// Daemon to distribute jobs to, as HOST:PORT. May be repeated.
    ///
    /// Merged with `[client].daemons` from the build description.
    #[arg(long = "daemon", value_name = "HOST:PORT")]
    pub daemons: Vec<String>,

    /// Build only this job and its prerequisites.
    ///
    /// Without it, every job that no other job depends on is built.
    #[arg(long, value_name = "NAME")]
    pub target: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JUNKNET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the job graph, but don't contact any daemon.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
