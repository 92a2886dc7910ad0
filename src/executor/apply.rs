use crate::executor::ExecutionPlan;
use crate::runner::{Command, Runner};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

/// Explicit execution context, in place of ambient process state
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionContext {
    /// Print commands without running them
    pub dry_run: bool,

    /// Check for root before the first command
    pub require_root: bool,

    /// Skip the interactive confirmation
    pub assume_yes: bool,
}

/// Print a command, then run it. Any failure ends the run.
pub fn run_command<W: Write>(
    command: &Command,
    runner: &mut dyn Runner,
    ctx: &ExecutionContext,
    out: &mut W,
) -> Result<()> {
    if ctx.dry_run {
        writeln!(out, "  {} {}", "Would run:".yellow(), command)?;
        return Ok(());
    }

    writeln!(out, "  {} {}", "Running:".cyan(), command)?;
    out.flush()?;

    runner.run(command)?;
    Ok(())
}

/// Walk the plan in order, stopping at the first failing command
pub fn apply_plan<W: Write>(
    plan: &ExecutionPlan,
    runner: &mut dyn Runner,
    ctx: &ExecutionContext,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", "=".repeat(50).bright_blue())?;
    writeln!(out, "{}", "Starting dockup install".bright_blue().bold())?;
    writeln!(out, "{}", "=".repeat(50).bright_blue())?;
    writeln!(out)?;

    if ctx.dry_run {
        writeln!(out, "{}", "[DRY RUN MODE]".yellow().bold())?;
        writeln!(out)?;
    }

    let total = plan.steps.len();
    for (i, step) in plan.steps.iter().enumerate() {
        writeln!(
            out,
            "{}",
            format!("[{}/{}] {}...", i + 1, total, step.name)
                .bright_cyan()
                .bold()
        )?;

        for command in &step.commands {
            run_command(command, runner, ctx, out)?;
        }

        log::debug!("Step '{}' done", step.name);
        writeln!(out)?;
    }

    if ctx.dry_run {
        writeln!(
            out,
            "{}",
            format!("Dry run complete: {} commands would run", plan.command_count()).yellow()
        )?;
    } else {
        writeln!(out, "{}", "✓ Docker installed".green().bold())?;
    }

    Ok(())
}
