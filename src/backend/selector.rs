//! Startup choice of the mixer tool

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

/// Mixer tools this crate can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    Amixer,
    Pamixer,
    Pactl,
}

impl BackendChoice {
    /// Executable name of the tool
    pub fn command(&self) -> &'static str {
        match self {
            BackendChoice::Amixer => "amixer",
            BackendChoice::Pamixer => "pamixer",
            BackendChoice::Pactl => "pactl",
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

impl FromStr for BackendChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amixer" => Ok(BackendChoice::Amixer),
            "pamixer" => Ok(BackendChoice::Pamixer),
            "pactl" => Ok(BackendChoice::Pactl),
            other => Err(ConfigError::Unsupported(other.to_string())),
        }
    }
}

/// Backend selection failed; fatal at startup
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid command `{0}`")]
    Unsupported(String),

    #[error("command `{0}` not installed")]
    NotInstalled(String),

    #[error("no available binary")]
    NoneAvailable,
}

/// Candidates in order of preference when no override is given
pub const CANDIDATES: [BackendChoice; 3] = [
    BackendChoice::Pamixer,
    BackendChoice::Pactl,
    BackendChoice::Amixer,
];

/// Sound servers that make the PulseAudio tools usable
const PULSE_SERVERS: [&str; 2] = ["pulseaudio", "pipewire-pulse"];

/// Resolve the backend once, honoring an explicit override
pub fn select(
    override_name: Option<&str>,
    is_installed: impl Fn(&str) -> bool,
) -> Result<BackendChoice, ConfigError> {
    if let Some(name) = override_name {
        let choice: BackendChoice = name.parse()?;
        if !is_installed(choice.command()) {
            return Err(ConfigError::NotInstalled(name.to_string()));
        }
        info!(backend = %choice, "using configured backend");
        return Ok(choice);
    }

    let has_pulse = PULSE_SERVERS.iter().any(|&server| is_installed(server));
    debug!(has_pulse, "probing mixer tools");

    let choice = CANDIDATES
        .into_iter()
        .filter(|c| has_pulse || *c == BackendChoice::Amixer)
        .find(|c| is_installed(c.command()))
        .ok_or(ConfigError::NoneAvailable)?;

    info!(backend = %choice, "detected backend");
    Ok(choice)
}
