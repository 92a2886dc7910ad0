use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// One program invocation inside a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
}

/// A logical shell invocation, expressed without a shell.
///
/// A command is one or more stages whose stdout feeds the next stage's stdin,
/// like a shell pipeline. The first stage can be given text on stdin and the
/// last stage's stdout can be discarded, which covers the
/// `echo ... | tee FILE > /dev/null` idiom without spawning a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    stages: Vec<Stage>,
    input: Option<String>,
    discard_output: bool,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            stages: vec![Stage {
                program: program.into(),
                args: Vec::new(),
            }],
            input: None,
            discard_output: false,
        }
    }

    /// Append an argument to the last stage
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.last_stage_mut().args.push(arg.into());
        self
    }

    /// Append arguments to the last stage
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.last_stage_mut()
            .args
            .extend(args.into_iter().map(Into::into));
        self
    }

    /// Start a new stage reading the previous stage's stdout
    pub fn pipe(mut self, program: impl Into<String>) -> Self {
        self.stages.push(Stage {
            program: program.into(),
            args: Vec::new(),
        });
        self
    }

    /// Feed `text` plus a trailing newline to the first stage's stdin
    pub fn with_input(mut self, text: impl Into<String>) -> Self {
        self.input = Some(text.into());
        self
    }

    /// Send the last stage's stdout to /dev/null
    pub fn discard_output(mut self) -> Self {
        self.discard_output = true;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn discards_output(&self) -> bool {
        self.discard_output
    }

    fn last_stage_mut(&mut self) -> &mut Stage {
        // `new` always creates one stage and nothing removes stages
        let last = self.stages.len() - 1;
        &mut self.stages[last]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(input) = &self.input {
            write!(f, "echo \"{}\" | ", input.replace('"', "\\\""))?;
        }

        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str(&quote(&stage.program))?;
            for arg in &stage.args {
                write!(f, " {}", quote(arg))?;
            }
        }

        if self.discard_output {
            f.write_str(" > /dev/null")?;
        }

        Ok(())
    }
}

/// Quote a word for display the way a POSIX shell would need it
fn quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));

    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}
