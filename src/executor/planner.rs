use crate::config::Config;
use crate::runner::Command;
use crate::system::HostFacts;

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub steps: Vec<Step>,
}

/// One logical setup action
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub commands: Vec<Command>,
}

impl ExecutionPlan {
    /// Every command in execution order
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.steps.iter().flat_map(|step| step.commands.iter())
    }

    pub fn command_count(&self) -> usize {
        self.commands().count()
    }
}

fn step(name: &str, commands: Vec<Command>) -> Step {
    Step {
        name: name.to_string(),
        commands,
    }
}

fn apt_install(packages: &[String]) -> Command {
    Command::new("apt").args(["install", "-y"]).args(packages.iter().cloned())
}

/// Build the fixed install sequence from config data.
///
/// The order never depends on host state: every run issues the same commands.
pub fn create_execution_plan(config: &Config, facts: &HostFacts) -> ExecutionPlan {
    let repo = &config.repository;
    let keyring = repo.keyring.to_string_lossy().into_owned();

    let steps = vec![
        step(
            "Update system",
            vec![
                Command::new("apt").arg("update"),
                Command::new("apt").args(["upgrade", "-y"]),
            ],
        ),
        step(
            "Install dependencies",
            vec![apt_install(&config.packages.prerequisites)],
        ),
        step(
            "Add Docker GPG key",
            vec![
                Command::new("mkdir")
                    .arg("-p")
                    .arg(repo.keyring_dir.to_string_lossy()),
                Command::new("curl")
                    .arg("-fsSL")
                    .arg(repo.key_url())
                    .pipe("gpg")
                    .args(["--dearmor", "-o"])
                    .arg(keyring),
            ],
        ),
        step(
            "Set up Docker repository",
            vec![Command::new("tee")
                .arg(repo.source_list.to_string_lossy())
                .with_input(repo.source_line(&facts.architecture, &facts.codename))
                .discard_output()],
        ),
        step(
            "Install Docker",
            vec![
                Command::new("apt").arg("update"),
                apt_install(&config.packages.docker),
            ],
        ),
        step(
            "Verify Docker",
            vec![Command::new("docker").arg("--version")],
        ),
    ];

    ExecutionPlan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bookworm, GOLDEN};

    #[test]
    fn default_plan_matches_golden_sequence() {
        let plan = create_execution_plan(&Config::default(), &bookworm());

        let rendered: Vec<String> = plan.commands().map(|c| c.to_string()).collect();
        assert_eq!(rendered, GOLDEN);
        assert_eq!(plan.command_count(), 9);
        assert_eq!(plan.steps.len(), 6);
    }

    #[test]
    fn repository_line_goes_to_tee_stdin() {
        let plan = create_execution_plan(&Config::default(), &bookworm());
        let register = &plan.steps[3].commands[0];

        assert_eq!(register.stages().len(), 1);
        assert_eq!(register.stages()[0].program, "tee");
        assert_eq!(
            register.input(),
            Some("deb [arch=amd64 signed-by=/etc/apt/keyrings/docker.gpg] https://download.docker.com/linux/debian bookworm stable")
        );
        assert!(register.discards_output());
    }

    #[test]
    fn package_lists_come_from_config() {
        let mut config = Config::default();
        config.packages.docker = vec!["docker-ce".to_string(), "docker-ce-cli".to_string()];

        let plan = create_execution_plan(&config, &bookworm());
        let install = plan.steps[4].commands[1].to_string();

        assert_eq!(install, "apt install -y docker-ce docker-ce-cli");
    }
}
