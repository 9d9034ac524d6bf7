//! Scripted runner for tests

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{CommandError, CommandRunner};

enum Reply {
    Output(String),
    Failure(String),
}

/// Replays canned output keyed by the space-joined argv and records every call
#[derive(Default)]
pub struct MockRunner {
    replies: RefCell<HashMap<String, Reply>>,
    installed: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(self, argv: &str, text: &str) -> Self {
        self.set_output(argv, text);
        self
    }

    /// Script a non-zero exit that still printed `stdout`
    pub fn with_failure(self, argv: &str, stdout: &str) -> Self {
        self.set_failure(argv, stdout);
        self
    }

    /// Script a failure after construction
    pub fn set_failure(&self, argv: &str, stdout: &str) {
        self.replies
            .borrow_mut()
            .insert(argv.to_string(), Reply::Failure(stdout.to_string()));
    }

    pub fn with_installed(mut self, programs: &[&str]) -> Self {
        self.installed
            .extend(programs.iter().map(|p| p.to_string()));
        self
    }

    /// Replace the reply for `argv` after construction
    pub fn set_output(&self, argv: &str, text: &str) {
        self.replies
            .borrow_mut()
            .insert(argv.to_string(), Reply::Output(text.to_string()));
    }

    /// Every argv seen so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls that did not start with a query verb of any backend
    pub fn mutations(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| {
                !(c.starts_with("pactl info")
                    || c.starts_with("pactl list")
                    || c.contains("--get-")
                    || c.contains("--list-")
                    || c.contains(" sget ")
                    || c.starts_with("aplay")
                    || c.starts_with("arecord"))
            })
            .cloned()
            .collect()
    }

    fn reply(&self, argv: &[&str]) -> Result<String, CommandError> {
        let joined = argv.join(" ");
        self.calls.borrow_mut().push(joined.clone());
        match self.replies.borrow().get(&joined) {
            Some(Reply::Output(text)) => Ok(text.clone()),
            Some(Reply::Failure(stdout)) => Err(CommandError::Failed {
                argv: joined,
                code: Some(1),
                stdout: stdout.clone(),
            }),
            None => Err(CommandError::NotFound { argv: joined }),
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, argv: &[&str]) -> Result<(), CommandError> {
        match self.reply(argv) {
            Err(CommandError::NotFound { .. }) => Ok(()),
            other => other.map(|_| ()),
        }
    }

    fn output(&self, argv: &[&str]) -> Result<String, CommandError> {
        self.reply(argv)
    }

    fn is_installed(&self, program: &str) -> bool {
        self.installed.contains(program)
    }
}
