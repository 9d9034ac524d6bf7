//! PulseAudio / PipeWire backend driving `pactl`

use std::rc::Rc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::command::CommandRunner;

use super::{
    clamp_step, AudioBackend, BackendChoice, BackendError, BackendOptions, Device, DeviceKind,
    DeviceState, VolumeState, VolumeStep,
};

pub struct PactlBackend {
    runner: Rc<dyn CommandRunner>,
    kind: DeviceKind,
    /// Tool index of the working device
    device: String,
    max_volume: u32,
}

impl PactlBackend {
    /// Create the backend, resolving the default device when none is configured
    pub fn new(runner: Rc<dyn CommandRunner>, options: BackendOptions) -> Result<Self, BackendError> {
        let kind = DeviceKind::from_input(options.is_input);
        let device = match options.device {
            Some(device) => device,
            None => default_device(runner.as_ref(), kind, false)?,
        };

        debug!(%device, kind = kind.as_str(), "pactl backend ready");

        Ok(Self {
            runner,
            kind,
            device,
            max_volume: options.max_volume,
        })
    }

    fn set_volume(&self, change: &str) -> Result<(), BackendError> {
        let verb = format!("set-{}-volume", self.kind.as_str());
        self.runner
            .run(&["pactl", "--", &verb, &self.device, change])?;
        Ok(())
    }

    /// Stream list and move verb for the configured kind
    fn stream_commands(&self) -> (&'static str, &'static str) {
        match self.kind {
            DeviceKind::Sink => ("sink-inputs", "move-sink-input"),
            DeviceKind::Source => ("source-outputs", "move-source-output"),
        }
    }
}

fn default_device(
    runner: &dyn CommandRunner,
    kind: DeviceKind,
    by_name: bool,
) -> Result<String, BackendError> {
    let info = runner.output(&["pactl", "info"])?;
    let name = parse_default_device(&info, kind);

    if by_name {
        return name.ok_or_else(|| BackendError::not_found(kind, None));
    }

    // Map the long device name to the numeric index pactl prints first
    let name = name.ok_or_else(|| BackendError::not_found(kind, None))?;
    let short = runner.output(&["pactl", "list", "short", kind.plural()])?;
    find_index(&short, &name).ok_or_else(|| BackendError::not_found(kind, Some(&name)))
}

impl AudioBackend for PactlBackend {
    fn choice(&self) -> BackendChoice {
        BackendChoice::Pactl
    }

    fn default_device(&self, by_name: bool) -> Result<String, BackendError> {
        default_device(self.runner.as_ref(), self.kind, by_name)
    }

    fn volume(&self) -> Result<VolumeState, BackendError> {
        let output = self
            .runner
            .output(&["pactl", "list", self.kind.plural()])?;
        Ok(parse_volume(output.trim(), self.kind, &self.device))
    }

    fn volume_up(&mut self, delta: u32) -> Result<(), BackendError> {
        let Some(current) = self.volume()?.percentage else {
            warn!(device = %self.device, "volume unknown, not raising");
            return Ok(());
        };

        let change = match clamp_step(current, delta, self.max_volume) {
            VolumeStep::Absolute(perc) => format!("{}%", perc),
            VolumeStep::Relative(delta) => format!("+{}%", delta),
        };
        self.set_volume(&change)
    }

    fn volume_down(&mut self, delta: u32) -> Result<(), BackendError> {
        self.set_volume(&format!("-{}%", delta))
    }

    fn toggle_mute(&mut self) -> Result<(), BackendError> {
        let verb = format!("set-{}-mute", self.kind.as_str());
        self.runner
            .run(&["pactl", &verb, &self.device, "toggle"])?;
        Ok(())
    }

    fn list_devices(&self) -> Result<Vec<Device>, BackendError> {
        let short = self
            .runner
            .output(&["pactl", "list", "short", self.kind.plural()])?;
        Ok(parse_short_listing(&short))
    }

    fn swap_device(&mut self, device: &Device) -> Result<(), BackendError> {
        let verb = format!("set-default-{}", self.kind.as_str());
        self.runner.run(&["pactl", &verb, &device.id])?;
        self.device = device.id.clone();

        let (list, mover) = self.stream_commands();
        let streams = self.runner.output(&["pactl", "list", "short", list])?;
        let ids = parse_stream_ids(&streams);
        for id in &ids {
            self.runner.run(&["pactl", mover, id, &self.device])?;
        }

        info!(
            device = %device.name,
            index = %self.device,
            moved = ids.len(),
            "switched default {}", self.kind.as_str()
        );
        Ok(())
    }
}

/// Find `Default Sink: <name>` (or `Source`) in `pactl info` output
pub(crate) fn parse_default_device(info: &str, kind: DeviceKind) -> Option<String> {
    let prefix = format!("Default {}: ", kind.capitalized());
    info.lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|name| name.trim().to_string())
}

/// Index (first column) of the short-listing line whose second column is `name`
pub(crate) fn find_index(short: &str, name: &str) -> Option<String> {
    short.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let index = parts.next()?;
        (parts.next()? == name).then(|| index.to_string())
    })
}

/// Devices from `pactl list short sinks|sources`
pub(crate) fn parse_short_listing(short: &str) -> Vec<Device> {
    short
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return None;
            }
            let state = parts[parts.len() - 1]
                .parse()
                .unwrap_or(DeviceState::Unknown);
            Some(Device::new(parts[0], parts[1], state))
        })
        .collect()
}

/// First column of every line of `pactl list short sink-inputs`
pub(crate) fn parse_stream_ids(short: &str) -> Vec<String> {
    short
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Mute flag and first channel percentage of `device` in `pactl list` output
///
/// `device` may be the numeric index (`Sink #3`) or the device name
/// (`Name: alsa_output...`). Anything that does not match yields unknown.
pub(crate) fn parse_volume(listing: &str, kind: DeviceKind, device: &str) -> VolumeState {
    let device = regex::escape(device);
    let pattern = format!(
        r"(?s){} (?:#{}(?:\s|$)|.*?Name: {}(?:\s|$)).*?Mute: (\w{{2,3}}).*?Volume:.*?(\d{{1,3}})%",
        kind.capitalized(),
        device,
        device
    );

    let Ok(re) = Regex::new(&pattern) else {
        return VolumeState::unknown();
    };

    match re.captures(listing) {
        Some(caps) => VolumeState {
            percentage: caps[2].parse().ok(),
            muted: Some(&caps[1] == "yes"),
        },
        None => VolumeState::unknown(),
    }
}
