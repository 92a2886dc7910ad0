use crate::config::{load_config_auto, validate_config};
use crate::executor::{create_execution_plan, ExecutionPlan};
use crate::runner::{Stage, SystemRunner};
use crate::system::resolve_host_facts;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Serialize)]
struct PlanView<'a> {
    steps: Vec<StepView<'a>>,
}

#[derive(Serialize)]
struct StepView<'a> {
    name: &'a str,
    commands: Vec<CommandView<'a>>,
}

#[derive(Serialize)]
struct CommandView<'a> {
    command: String,
    stages: &'a [Stage],
    #[serde(skip_serializing_if = "Option::is_none")]
    stdin: Option<&'a str>,
}

pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let (_, config) = load_config_auto(config_path)?;
    validate_config(&config)?;

    let facts = resolve_host_facts(&config.repository, &mut SystemRunner::new(), true)?;
    let plan = create_execution_plan(&config, &facts);

    let mut out = io::stdout();
    if json {
        write_json(&plan, &mut out)
    } else {
        write_text(&plan, &mut out)
    }
}

fn write_json<W: Write>(plan: &ExecutionPlan, out: &mut W) -> Result<()> {
    let view = PlanView {
        steps: plan
            .steps
            .iter()
            .map(|step| StepView {
                name: &step.name,
                commands: step
                    .commands
                    .iter()
                    .map(|cmd| CommandView {
                        command: cmd.to_string(),
                        stages: cmd.stages(),
                        stdin: cmd.input(),
                    })
                    .collect(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(&mut *out, &view)?;
    writeln!(out)?;
    Ok(())
}

fn write_text<W: Write>(plan: &ExecutionPlan, out: &mut W) -> Result<()> {
    for (i, step) in plan.steps.iter().enumerate() {
        writeln!(out, "{}", format!("{}. {}", i + 1, step.name).bold())?;
        for cmd in &step.commands {
            writeln!(out, "   {}", cmd)?;
        }
    }
    writeln!(out)?;
    writeln!(out, "{} commands", plan.command_count())?;
    Ok(())
}
