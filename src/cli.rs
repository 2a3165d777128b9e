// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `nia-config`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nia-config",
    version,
    about = "Merge, finalize and validate network infrastructure automation configuration.",
    long_about = None
)]
pub struct CliArgs {
    /// Config file or directory (TOML or JSON). Repeat to merge several;
    /// later paths override earlier ones.
    #[arg(long, value_name = "PATH", default_value = "nia-config.toml")]
    pub config: Vec<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NIA_CONFIG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the finalized configuration (credentials redacted).
    #[arg(long)]
    pub inspect: bool,

    /// Treat warnings (deprecated fields, overridden values) as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
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
