mod cli;
mod commands;
mod config;
mod executor;
mod runner;
mod system;
mod utils;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use colored::Colorize;
use runner::CommandError;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Install { dry_run, yes } => {
            commands::install::run(cli.config.as_deref(), dry_run, yes)?;
        }
        Command::Plan { json } => {
            commands::plan::run(cli.config.as_deref(), json)?;
        }
        Command::Check => {
            commands::check::run(cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Mirror the failing child's exit status; 1 for everything else
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandError>())
        .map(|cmd_err| u8::try_from(cmd_err.exit_code()).unwrap_or(1))
        .filter(|&code| code != 0)
        .unwrap_or(1)
}
