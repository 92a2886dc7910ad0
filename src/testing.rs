//! Test doubles shared by unit tests.

use crate::runner::{Command, CommandError, Runner};
use crate::system::HostFacts;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Something observable that happened during a test run, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Printed(String),
    Ran(String),
    Queried(String),
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

/// Runner that records every command instead of executing it
#[derive(Debug, Default)]
pub struct RecordingRunner {
    pub journal: Journal,
    fail_on: Option<(String, i32)>,
    answers: HashMap<String, String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first command whose text starts with `prefix`
    pub fn failing_on(mut self, prefix: &str, code: i32) -> Self {
        self.fail_on = Some((prefix.to_string(), code));
        self
    }

    /// Answer `query` for an exact command text
    pub fn answering(mut self, command: &str, stdout: &str) -> Self {
        self.answers.insert(command.to_string(), stdout.to_string());
        self
    }

    pub fn output(&self) -> JournalWriter {
        JournalWriter {
            journal: Rc::clone(&self.journal),
            pending: Vec::new(),
        }
    }

    /// Text of every command passed to `run`, in order
    pub fn ran(&self) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Ran(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.borrow().clone()
    }
}

impl Runner for RecordingRunner {
    fn run(&mut self, command: &Command) -> Result<(), CommandError> {
        let text = command.to_string();
        self.journal.borrow_mut().push(Event::Ran(text.clone()));

        match &self.fail_on {
            Some((prefix, code)) if text.starts_with(prefix.as_str()) => Err(CommandError::Failed {
                command: text,
                code: *code,
            }),
            _ => Ok(()),
        }
    }

    fn query(&mut self, command: &Command) -> Result<String, CommandError> {
        let text = command.to_string();
        self.journal.borrow_mut().push(Event::Queried(text.clone()));

        self.answers
            .get(&text)
            .cloned()
            .ok_or(CommandError::Failed {
                command: text,
                code: 1,
            })
    }
}

/// `Write` sink that records each completed line into the journal
#[derive(Debug)]
pub struct JournalWriter {
    journal: Journal,
    pending: Vec<u8>,
}

impl Write for JournalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            self.journal.borrow_mut().push(Event::Printed(text));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Host facts of a typical amd64 Debian 12 machine
pub fn bookworm() -> HostFacts {
    HostFacts {
        architecture: "amd64".to_string(),
        codename: "bookworm".to_string(),
    }
}

/// Commands issued by a default install on [`bookworm`], in order
pub const GOLDEN: [&str; 9] = [
    "apt update",
    "apt upgrade -y",
    "apt install -y ca-certificates curl gnupg lsb-release",
    "mkdir -p /etc/apt/keyrings",
    "curl -fsSL https://download.docker.com/linux/debian/gpg | gpg --dearmor -o /etc/apt/keyrings/docker.gpg",
    "echo \"deb [arch=amd64 signed-by=/etc/apt/keyrings/docker.gpg] https://download.docker.com/linux/debian bookworm stable\" | tee /etc/apt/sources.list.d/docker.list > /dev/null",
    "apt update",
    "apt install -y docker-ce docker-ce-cli containerd.io docker-buildx-plugin docker-compose-plugin",
    "docker --version",
];
