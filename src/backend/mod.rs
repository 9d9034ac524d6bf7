//! Mixer backends
//!
//! Each backend drives one external mixer tool (`amixer`, `pamixer` or
//! `pactl`) and turns its text output into [`VolumeState`] and [`Device`]
//! values. The concrete backend is picked once at startup by
//! [`selector::select`] and used through the [`AudioBackend`] trait.

mod amixer;
#[cfg(test)]
pub mod fake;
mod pactl;
mod pamixer;
mod registry;
pub mod selector;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::command::{CommandError, CommandRunner};

pub use amixer::AmixerBackend;
pub use pactl::PactlBackend;
pub use pamixer::PamixerBackend;
pub use registry::DeviceRegistry;
pub use selector::BackendChoice;

/// Liveness of a device as reported by the mixer tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    Running,
    Idle,
    Suspended,
    #[default]
    Unknown,
}

impl FromStr for DeviceState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => DeviceState::Running,
            "IDLE" => DeviceState::Idle,
            "SUSPENDED" => DeviceState::Suspended,
            _ => DeviceState::Unknown,
        })
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Running => write!(f, "RUNNING"),
            DeviceState::Idle => write!(f, "IDLE"),
            DeviceState::Suspended => write!(f, "SUSPENDED"),
            DeviceState::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One entry of a tool's device listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Identifier the tool accepts in mutation commands (index or PCM name)
    pub id: String,
    /// Stable device name, shown in edit mode
    pub name: String,
    pub state: DeviceState,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: DeviceState) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state,
        }
    }
}

/// Current volume of the working device
///
/// `None` means the tool output could not be parsed. That is not an error,
/// live tools occasionally omit fields and the widget renders it as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeState {
    pub percentage: Option<u32>,
    pub muted: Option<bool>,
}

impl VolumeState {
    pub fn new(percentage: u32, muted: bool) -> Self {
        Self {
            percentage: Some(percentage),
            muted: Some(muted),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Output (sink) or input (source) side of the audio stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Sink,
    Source,
}

impl DeviceKind {
    pub fn from_input(is_input: bool) -> Self {
        if is_input {
            DeviceKind::Source
        } else {
            DeviceKind::Sink
        }
    }

    /// `sink` / `source`
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Sink => "sink",
            DeviceKind::Source => "source",
        }
    }

    /// `sinks` / `sources`
    pub fn plural(&self) -> &'static str {
        match self {
            DeviceKind::Sink => "sinks",
            DeviceKind::Source => "sources",
        }
    }

    /// `Sink` / `Source`, as printed in headings of the tool output
    pub fn capitalized(&self) -> &'static str {
        match self {
            DeviceKind::Sink => "Sink",
            DeviceKind::Source => "Source",
        }
    }

    pub fn direction(&self) -> &'static str {
        match self {
            DeviceKind::Sink => "output",
            DeviceKind::Source => "input",
        }
    }
}

/// Errors raised by backend operations
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to find {kind} device, looked for {looked_for:?}")]
    DeviceNotFound {
        kind: &'static str,
        looked_for: Option<String>,
    },
}

impl BackendError {
    pub(crate) fn not_found(kind: DeviceKind, looked_for: Option<&str>) -> Self {
        BackendError::DeviceNotFound {
            kind: kind.direction(),
            looked_for: looked_for.map(str::to_string),
        }
    }
}

/// Settings shared by every backend
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    pub card: Option<String>,
    pub channel: Option<String>,
    pub device: Option<String>,
    pub is_input: bool,
    pub max_volume: u32,
}

/// How a volume increase should be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStep {
    /// Set exactly this percentage
    Absolute(u32),
    /// Raise by this many percent
    Relative(u32),
}

/// Pick the increase command that never overshoots `ceiling`
pub fn clamp_step(current: u32, delta: u32, ceiling: u32) -> VolumeStep {
    if current.saturating_add(delta) >= ceiling {
        VolumeStep::Absolute(ceiling)
    } else {
        VolumeStep::Relative(delta)
    }
}

/// Common contract of all mixer backends
pub trait AudioBackend {
    /// Which tool this backend drives
    fn choice(&self) -> BackendChoice;

    /// Default device of the configured kind, by name or by tool index
    fn default_device(&self, by_name: bool) -> Result<String, BackendError>;

    /// Read volume and mute state of the working device
    fn volume(&self) -> Result<VolumeState, BackendError>;

    /// Raise the volume by `delta` percent, clamped at the configured ceiling
    fn volume_up(&mut self, delta: u32) -> Result<(), BackendError>;

    /// Lower the volume by `delta` percent; the tool clamps at zero
    fn volume_down(&mut self, delta: u32) -> Result<(), BackendError>;

    /// Ask the tool to flip the mute state
    fn toggle_mute(&mut self) -> Result<(), BackendError>;

    /// Devices of the configured kind, in the tool's listing order
    fn list_devices(&self) -> Result<Vec<Device>, BackendError>;

    /// Make `device` the working device
    fn swap_device(&mut self, device: &Device) -> Result<(), BackendError>;
}

/// Instantiate the backend for `choice`
pub fn build(
    choice: BackendChoice,
    runner: Rc<dyn CommandRunner>,
    options: BackendOptions,
) -> Result<Box<dyn AudioBackend>, BackendError> {
    let backend: Box<dyn AudioBackend> = match choice {
        BackendChoice::Amixer => Box::new(AmixerBackend::new(runner, options)),
        BackendChoice::Pamixer => Box::new(PamixerBackend::new(runner, options)),
        BackendChoice::Pactl => Box::new(PactlBackend::new(runner, options)?),
    };
    Ok(backend)
}
