use crate::config::{load_config_auto, validate_config, Config};
use crate::executor::{apply_plan, create_execution_plan, ExecutionContext};
use crate::runner::{Runner, SystemRunner};
use crate::system::{is_root, resolve_host_facts};
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

pub fn run(config_path: Option<&Path>, dry_run: bool, assume_yes: bool) -> Result<()> {
    let (_, config) = load_config_auto(config_path)?;
    validate_config(&config)?;

    let ctx = ExecutionContext {
        dry_run,
        require_root: config.settings.require_root,
        // Unattended runs proceed without asking, like a plain script would
        assume_yes: assume_yes || !io::stdin().is_terminal(),
    };

    let mut runner = SystemRunner::new();
    install(&config, &ctx, &mut runner, &mut io::stdout())
}

/// Check privileges, resolve host facts, confirm, then run the plan
pub fn install<W: Write>(
    config: &Config,
    ctx: &ExecutionContext,
    runner: &mut dyn Runner,
    out: &mut W,
) -> Result<()> {
    if ctx.require_root && !ctx.dry_run && !is_root(runner)? {
        anyhow::bail!("dockup install must run as root (try: sudo dockup install)");
    }

    let facts = resolve_host_facts(&config.repository, runner, ctx.dry_run)?;
    let plan = create_execution_plan(config, &facts);

    if !ctx.dry_run && !ctx.assume_yes {
        let confirmed = inquire::Confirm::new(&format!(
            "Run {} commands to install Docker ({} {})?",
            plan.command_count(),
            facts.codename,
            facts.architecture
        ))
        .with_default(true)
        .prompt()
        .context("Failed to read confirmation")?;

        if !confirmed {
            writeln!(out, "{}", "Install cancelled.".yellow())?;
            return Ok(());
        }
    }

    apply_plan(&plan, runner, ctx, out)
}
