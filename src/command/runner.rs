//! Blocking subprocess runner built on `std::process::Command`

use std::io::ErrorKind;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};

use super::CommandError;

/// Runs external programs on behalf of the mixer backends
pub trait CommandRunner {
    /// Run a command for its side effect, discarding output
    fn run(&self, argv: &[&str]) -> Result<(), CommandError>;

    /// Run a command and capture its standard output as text
    fn output(&self, argv: &[&str]) -> Result<String, CommandError>;

    /// Check whether a program is installed
    fn is_installed(&self, program: &str) -> bool;
}

/// Runner that spawns real child processes and blocks until they exit
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn exec(&self, argv: &[&str]) -> Result<Output, CommandError> {
        let joined = argv.join(" ");
        let (program, args) = argv.split_first().ok_or_else(|| CommandError::Io {
            argv: joined.clone(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "empty argv"),
        })?;

        debug!(argv = %joined, "spawning command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => CommandError::NotFound {
                    argv: joined.clone(),
                },
                _ => CommandError::Io {
                    argv: joined.clone(),
                    source: e,
                },
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(CommandError::Failed {
                argv: joined,
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            })
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[&str]) -> Result<(), CommandError> {
        self.exec(argv).map(|_| ())
    }

    fn output(&self, argv: &[&str]) -> Result<String, CommandError> {
        let output = self.exec(argv)?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!(bytes = text.len(), "captured command output");
        Ok(text)
    }

    fn is_installed(&self, program: &str) -> bool {
        Command::new("which")
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}
