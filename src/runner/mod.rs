pub mod command;

pub use command::{Command, Stage};

use std::io::{self, Write};
use std::process::{self, Child, ExitStatus, Stdio};
use thiserror::Error;

/// Failure of a single command. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command `{command}` failed with exit code {code}")]
    Failed { command: String, code: i32 },

    #[error("command `{command}` was terminated by signal {signal}")]
    Signaled { command: String, signal: i32 },

    #[error("failed to start `{program}` for command `{command}`")]
    Spawn {
        command: String,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running `{command}`")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

impl CommandError {
    /// Process exit code that reports this failure, shell-style
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Failed { code, .. } => *code,
            CommandError::Signaled { signal, .. } => 128 + signal,
            CommandError::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound => 127,
            CommandError::Spawn { .. } => 126,
            CommandError::Io { .. } => 1,
        }
    }
}

/// Executes commands on behalf of the installer
pub trait Runner {
    /// Run a command with inherited stdout/stderr, failing on non-zero exit
    fn run(&mut self, command: &Command) -> Result<(), CommandError>;

    /// Run a command and return its trimmed stdout
    fn query(&mut self, command: &Command) -> Result<String, CommandError>;
}

/// Runs commands as real child processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn execute(&self, command: &Command, capture: bool) -> Result<Vec<u8>, CommandError> {
        let display = command.to_string();
        let stages = command.stages();
        let mut children: Vec<Child> = Vec::with_capacity(stages.len());
        let mut upstream = None;

        for (i, stage) in stages.iter().enumerate() {
            let last = i + 1 == stages.len();
            log::debug!("Spawning: {} {:?}", stage.program, stage.args);

            let mut process = process::Command::new(&stage.program);
            process.args(&stage.args);

            if let Some(stdout) = upstream.take() {
                process.stdin(Stdio::from(stdout));
            } else if command.input().is_some() {
                process.stdin(Stdio::piped());
            }

            if !last || capture {
                process.stdout(Stdio::piped());
            } else if command.discards_output() {
                process.stdout(Stdio::null());
            }

            let mut child = match process.spawn() {
                Ok(child) => child,
                Err(source) => {
                    reap(children);
                    return Err(CommandError::Spawn {
                        command: display,
                        program: stage.program.clone(),
                        source,
                    });
                }
            };

            if !last {
                upstream = child.stdout.take();
            }
            children.push(child);
        }

        // A stage that exits before reading all its input closes the pipe;
        // its exit status decides the outcome, not the write error
        let mut broken_pipe = None;
        if let Some(input) = command.input() {
            if let Some(mut stdin) = children.first_mut().and_then(|c| c.stdin.take()) {
                // stdin is dropped at the end of this block, closing the pipe
                match writeln!(stdin, "{}", input) {
                    Ok(()) => {}
                    Err(source) if source.kind() == io::ErrorKind::BrokenPipe => {
                        log::debug!("Input for `{}` not fully read: {}", display, source);
                        broken_pipe = Some(source);
                    }
                    Err(source) => {
                        reap(children);
                        return Err(CommandError::Io {
                            command: display,
                            source,
                        });
                    }
                }
            }
        }

        let io_error = |source| CommandError::Io {
            command: display.clone(),
            source,
        };

        // Drain the last stage first so a full pipe can never block the others
        let last = children.pop().ok_or_else(|| {
            io_error(io::Error::new(io::ErrorKind::InvalidInput, "empty command"))
        })?;
        let output = last.wait_with_output().map_err(io_error)?;

        let mut statuses = Vec::with_capacity(stages.len());
        for mut child in children {
            statuses.push(child.wait().map_err(io_error)?);
        }
        statuses.push(output.status);

        for status in statuses {
            check_status(&display, status)?;
        }

        if let Some(source) = broken_pipe {
            return Err(io_error(source));
        }

        Ok(output.stdout)
    }
}

impl Runner for SystemRunner {
    fn run(&mut self, command: &Command) -> Result<(), CommandError> {
        self.execute(command, false).map(|_| ())
    }

    fn query(&mut self, command: &Command) -> Result<String, CommandError> {
        let stdout = self.execute(command, true)?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }
}

/// Kill and wait for already-spawned stages after a pipeline setup failure
fn reap(children: Vec<Child>) {
    for mut child in children {
        let _ = child.kill();
        let _ = child.wait();
    }
}

fn check_status(command: &str, status: ExitStatus) -> Result<(), CommandError> {
    if status.success() {
        return Ok(());
    }

    if let Some(code) = status.code() {
        return Err(CommandError::Failed {
            command: command.to_string(),
            code,
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(CommandError::Signaled {
                command: command.to_string(),
                signal,
            });
        }
    }

    Err(CommandError::Failed {
        command: command.to_string(),
        code: 1,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_succeeds_on_zero_exit() {
        let mut runner = SystemRunner::new();
        runner.run(&Command::new("true")).unwrap();
    }

    #[test]
    fn run_reports_exit_code() {
        let mut runner = SystemRunner::new();
        let err = runner
            .run(&Command::new("sh").args(["-c", "exit 3"]))
            .unwrap_err();

        assert!(matches!(err, CommandError::Failed { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("sh -c 'exit 3'"));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let mut runner = SystemRunner::new();
        let err = runner
            .run(&Command::new("dockup-no-such-program-here"))
            .unwrap_err();

        assert!(matches!(err, CommandError::Spawn { .. }));
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn query_captures_trimmed_stdout() {
        let mut runner = SystemRunner::new();
        let out = runner
            .query(&Command::new("echo").arg("  hello  "))
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn pipeline_feeds_stages_and_input() {
        let mut runner = SystemRunner::new();
        let cmd = Command::new("cat")
            .with_input("deb stable")
            .pipe("tr")
            .args(["a-z", "A-Z"]);

        assert_eq!(runner.query(&cmd).unwrap(), "DEB STABLE");
    }

    #[test]
    fn pipeline_fails_when_an_early_stage_fails() {
        let mut runner = SystemRunner::new();
        let cmd = Command::new("sh")
            .args(["-c", "exit 5"])
            .pipe("cat");

        let err = runner.run(&cmd).unwrap_err();
        assert!(matches!(err, CommandError::Failed { code: 5, .. }));
    }

    #[test]
    fn tee_writes_input_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docker.list");
        let cmd = Command::new("tee")
            .arg(path.to_string_lossy())
            .with_input("deb [arch=amd64] https://example.com bookworm stable")
            .discard_output();

        SystemRunner::new().run(&cmd).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "deb [arch=amd64] https://example.com bookworm stable\n");
    }

    #[test]
    fn early_exit_reports_status_not_unread_input() {
        let mut runner = SystemRunner::new();
        let cmd = Command::new("sh")
            .args(["-c", "exit 7"])
            .with_input("x".repeat(1 << 20));

        let err = runner.run(&cmd).unwrap_err();

        assert!(matches!(err, CommandError::Failed { code: 7, .. }), "{:?}", err);
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn unread_input_is_an_error_when_every_stage_succeeds() {
        let mut runner = SystemRunner::new();
        let cmd = Command::new("true").with_input("x".repeat(1 << 20));

        let err = runner.run(&cmd).unwrap_err();

        assert!(matches!(err, CommandError::Io { .. }), "{:?}", err);
    }
}
