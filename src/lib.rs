// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;

use anyhow::{bail, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::Config;

/// High-level entry point used by `main.rs`.
///
/// Loads every `--config` path, merges, finalizes and validates. With
/// `--strict` any advisory warning fails the run; with `--inspect` the
/// finalized configuration is printed.
pub fn run(args: CliArgs) -> Result<()> {
    let (config, diags) = load_and_validate(&args.config)?;

    if args.strict && !diags.is_empty() {
        let messages: Vec<String> = diags.iter().map(ToString::to_string).collect();
        bail!(
            "{} warning(s) with --strict:\n  {}",
            messages.len(),
            messages.join("\n  ")
        );
    }

    if args.inspect {
        print_inspect(&config);
    } else {
        info!(
            paths = ?args.config,
            tasks = config.task.len(),
            "configuration is valid"
        );
    }
    Ok(())
}

fn print_inspect(config: &Config) {
    println!("{config:#?}");
}
