//! Signal handling for shutdown and forced refresh

use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// What a received signal asks the main loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// SIGTERM or SIGINT
    Shutdown,
    /// SIGUSR1, redraw immediately
    Refresh,
}

/// Handles SIGTERM, SIGINT and SIGUSR1
pub struct Signals {
    sigterm: Signal,
    sigint: Signal,
    sigusr1: Signal,
}

impl Signals {
    /// Register the signal handlers
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
            sigusr1: signal(SignalKind::user_defined1())?,
        })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> SignalAction {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
                SignalAction::Shutdown
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
                SignalAction::Shutdown
            }
            _ = self.sigusr1.recv() => {
                debug!("received SIGUSR1");
                SignalAction::Refresh
            }
        }
    }
}
