//! External process execution
//!
//! Every mixer backend talks to its tool through a [`CommandRunner`], so the
//! parsing and argv construction can be exercised without spawning anything.

mod runner;

#[cfg(test)]
pub mod mock;

pub use runner::{CommandRunner, SystemRunner};

/// A subprocess could not be run or exited unsuccessfully
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command `{argv}` not installed")]
    NotFound { argv: String },

    #[error("command `{argv}` exited with status {code:?}")]
    Failed {
        argv: String,
        code: Option<i32>,
        /// Captured standard output, some tools print useful data before failing
        stdout: String,
    },

    #[error("failed to run `{argv}`: {source}")]
    Io {
        argv: String,
        #[source]
        source: std::io::Error,
    },
}
