use crate::config::{load_config_auto, validate_config};
use crate::runner::SystemRunner;
use crate::system::{is_root, resolve_host_facts};
use crate::utils;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Tools the plan calls before it installs anything itself
const REQUIRED_TOOLS: &[&str] = &["apt", "dpkg", "mkdir", "tee"];

/// Tools the "Install dependencies" step provides if missing
const PROVIDED_TOOLS: &[&str] = &["curl", "gpg", "lsb_release"];

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let (path, config) = load_config_auto(config_path)?;
    let mut problems = 0;

    println!("{}", "🔍 Checking host...".bright_cyan().bold());

    match &path {
        Some(p) => println!("  ✓ Config: {}", p.display()),
        None => println!("  ✓ Config: built-in defaults"),
    }

    if let Err(e) = validate_config(&config) {
        println!("  ❌ Config invalid: {}", e.to_string().red());
        problems += 1;
    }

    let mut runner = SystemRunner::new();

    match is_root(&mut runner) {
        Ok(true) => println!("  ✓ Running as root"),
        Ok(false) if config.settings.require_root => {
            println!("  ❌ {}", "Not running as root".red());
            problems += 1;
        }
        Ok(false) => println!("  ⚠️  {}", "Not running as root (require_root = false)".yellow()),
        Err(e) => {
            println!("  ❌ {}", format!("{:#}", e).red());
            problems += 1;
        }
    }

    for tool in REQUIRED_TOOLS {
        if utils::command_exists(tool) {
            println!("  ✓ {} found", tool.green());
        } else {
            println!("  ❌ {} not found", tool.red());
            problems += 1;
        }
    }

    for tool in PROVIDED_TOOLS {
        if utils::command_exists(tool) {
            println!("  ✓ {} found", tool.green());
        } else {
            println!("  ℹ️  {} missing, will be installed", tool.cyan());
        }
    }

    match resolve_host_facts(&config.repository, &mut runner, false) {
        Ok(facts) => println!(
            "  ✓ Target: {} {}",
            facts.codename.green(),
            facts.architecture.green()
        ),
        Err(e) => {
            println!("  ❌ {}", format!("{:#}", e).red());
            problems += 1;
        }
    }

    if utils::command_exists("docker") {
        println!(
            "  ℹ️  {}",
            "docker is already on PATH; install will re-run every step".cyan()
        );
    }

    println!();

    if problems > 0 {
        anyhow::bail!("Preflight check found {} problem(s)", problems);
    }

    println!("{}", "✓ Ready to install".green().bold());
    Ok(())
}
