//! PulseAudio backend driving `pamixer`

use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::command::{CommandError, CommandRunner};

use super::{
    clamp_step, AudioBackend, BackendChoice, BackendError, BackendOptions, Device, DeviceKind,
    DeviceState, VolumeState, VolumeStep,
};

pub struct PamixerBackend {
    runner: Rc<dyn CommandRunner>,
    kind: DeviceKind,
    /// Explicit device, `None` lets pamixer use the server default
    device: Option<String>,
    max_volume: u32,
}

impl PamixerBackend {
    pub fn new(runner: Rc<dyn CommandRunner>, options: BackendOptions) -> Self {
        Self {
            runner,
            kind: DeviceKind::from_input(options.is_input),
            device: options.device,
            max_volume: options.max_volume,
        }
    }

    fn argv<'a>(&'a self, extra: &[&'a str]) -> Vec<&'a str> {
        let mut argv = vec!["pamixer", "--allow-boost"];
        match (&self.device, self.kind) {
            (Some(device), DeviceKind::Sink) => argv.extend(["--sink", device.as_str()]),
            (Some(device), DeviceKind::Source) => argv.extend(["--source", device.as_str()]),
            (None, DeviceKind::Source) => argv.push("--default-source"),
            (None, DeviceKind::Sink) => {}
        }
        argv.extend_from_slice(extra);
        argv
    }

    fn run(&self, extra: &[&str]) -> Result<(), BackendError> {
        self.runner.run(&self.argv(extra))?;
        Ok(())
    }
}

impl AudioBackend for PamixerBackend {
    fn choice(&self) -> BackendChoice {
        BackendChoice::Pamixer
    }

    fn default_device(&self, by_name: bool) -> Result<String, BackendError> {
        if let Some(working) = &self.device {
            // The working device is what every command targets, so report it
            let listed = self
                .list_devices()?
                .into_iter()
                .find(|d| d.id == *working || d.name == *working);
            return Ok(match listed {
                Some(device) if by_name => device.name,
                Some(device) => device.id,
                None => working.clone(),
            });
        }

        if self.kind == DeviceKind::Source {
            // pamixer cannot report the default source
            return Err(BackendError::not_found(self.kind, None));
        }

        let output = self.runner.output(&["pamixer", "--get-default-sink"])?;
        let device = parse_listing(&output)
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::not_found(self.kind, None))?;

        Ok(if by_name { device.name } else { device.id })
    }

    fn volume(&self) -> Result<VolumeState, BackendError> {
        // pamixer may exit non-zero here but still prints the state on stdout
        let output = match self.runner.output(&self.argv(&["--get-mute", "--get-volume"])) {
            Ok(output) => output,
            Err(CommandError::Failed { stdout, .. }) => stdout,
            Err(e) => return Err(e.into()),
        };
        Ok(parse_volume(&output))
    }

    fn volume_up(&mut self, delta: u32) -> Result<(), BackendError> {
        let Some(current) = self.volume()?.percentage else {
            warn!("volume unknown, not raising");
            return Ok(());
        };

        match clamp_step(current, delta, self.max_volume) {
            VolumeStep::Absolute(perc) => self.run(&["--set-volume", &perc.to_string()]),
            VolumeStep::Relative(delta) => self.run(&["--increase", &delta.to_string()]),
        }
    }

    fn volume_down(&mut self, delta: u32) -> Result<(), BackendError> {
        self.run(&["--decrease", &delta.to_string()])
    }

    fn toggle_mute(&mut self) -> Result<(), BackendError> {
        self.run(&["--toggle-mute"])
    }

    fn list_devices(&self) -> Result<Vec<Device>, BackendError> {
        let flag = format!("--list-{}", self.kind.plural());
        let output = self.runner.output(&["pamixer", &flag])?;
        Ok(parse_listing(&output))
    }

    fn swap_device(&mut self, device: &Device) -> Result<(), BackendError> {
        self.device = Some(device.id.clone());
        info!(device = %device.name, index = %device.id, "pamixer now targets device");
        Ok(())
    }
}

/// `<true|false> <percentage>` as printed by `--get-mute --get-volume`
pub(crate) fn parse_volume(output: &str) -> VolumeState {
    let parts: Vec<&str> = output.split_whitespace().collect();
    let [muted, perc] = parts.as_slice() else {
        return VolumeState::unknown();
    };
    match perc.parse() {
        Ok(perc) => VolumeState::new(perc, *muted == "true"),
        Err(_) => VolumeState::unknown(),
    }
}

/// Device lines of `--list-sinks`, `--list-sources` and `--get-default-sink`
///
/// Lines look like `<index> "<name>" "<state>" "<description>"`; older
/// pamixer releases omit the state field.
pub(crate) fn parse_listing(output: &str) -> Vec<Device> {
    static LINE: OnceLock<Regex> = OnceLock::new();
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    let line_re = LINE.get_or_init(|| Regex::new(r"^(\d+)\s+(.*)$").expect("valid regex"));
    let quoted_re = QUOTED.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

    output
        .lines()
        .filter_map(|line| {
            let caps = line_re.captures(line.trim())?;
            let fields: Vec<&str> = quoted_re
                .captures_iter(&caps[2])
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .collect();
            let name = fields.first()?;
            let state = if fields.len() >= 3 {
                fields[1].parse().unwrap_or(DeviceState::Unknown)
            } else {
                DeviceState::Unknown
            };
            Some(Device::new(&caps[1], *name, state))
        })
        .collect()
}
