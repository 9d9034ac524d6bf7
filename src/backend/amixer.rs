//! ALSA backend driving `amixer`

use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::command::CommandRunner;

use super::{
    clamp_step, AudioBackend, BackendChoice, BackendError, BackendOptions, Device, DeviceKind,
    DeviceState, VolumeState, VolumeStep,
};

/// ALSA simple controls never go past full scale
const ALSA_CEILING: u32 = 100;

pub struct AmixerBackend {
    runner: Rc<dyn CommandRunner>,
    kind: DeviceKind,
    card: Option<String>,
    channel: String,
    device: String,
    max_volume: u32,
}

impl AmixerBackend {
    pub fn new(runner: Rc<dyn CommandRunner>, options: BackendOptions) -> Self {
        let kind = DeviceKind::from_input(options.is_input);
        let channel = options.channel.unwrap_or_else(|| {
            match kind {
                DeviceKind::Sink => "Master",
                DeviceKind::Source => "Capture",
            }
            .to_string()
        });

        Self {
            runner,
            kind,
            card: options.card,
            channel,
            device: options.device.unwrap_or_else(|| "default".to_string()),
            max_volume: options.max_volume.min(ALSA_CEILING),
        }
    }

    fn argv<'a>(&'a self, mode: &'a str, verb: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
        let mut argv = vec!["amixer", mode];
        // -c and -D both pick the control device; a card wins when set
        match &self.card {
            Some(card) => argv.extend(["-c", card.as_str()]),
            None => argv.extend(["-D", self.device.as_str()]),
        }
        argv.extend([verb, self.channel.as_str()]);
        argv.extend_from_slice(extra);
        argv
    }

    fn set(&self, value: &str) -> Result<(), BackendError> {
        self.runner.run(&self.argv("-q", "sset", &[value]))?;
        Ok(())
    }

    fn pcm_lister(&self) -> &'static str {
        match self.kind {
            DeviceKind::Sink => "aplay",
            DeviceKind::Source => "arecord",
        }
    }
}

impl AudioBackend for AmixerBackend {
    fn choice(&self) -> BackendChoice {
        BackendChoice::Amixer
    }

    fn default_device(&self, by_name: bool) -> Result<String, BackendError> {
        if by_name {
            return Ok(self.device.clone());
        }
        self.list_devices()?
            .iter()
            .position(|d| d.name == self.device)
            .map(|i| i.to_string())
            .ok_or_else(|| BackendError::not_found(self.kind, Some(&self.device)))
    }

    fn volume(&self) -> Result<VolumeState, BackendError> {
        let output = self.runner.output(&self.argv("-M", "sget", &[]))?;
        Ok(parse_volume(&output))
    }

    fn volume_up(&mut self, delta: u32) -> Result<(), BackendError> {
        let Some(current) = self.volume()?.percentage else {
            warn!(channel = %self.channel, "volume unknown, not raising");
            return Ok(());
        };

        match clamp_step(current, delta, self.max_volume) {
            VolumeStep::Absolute(perc) => self.set(&format!("{}%", perc)),
            VolumeStep::Relative(delta) => self.set(&format!("{}%+", delta)),
        }
    }

    fn volume_down(&mut self, delta: u32) -> Result<(), BackendError> {
        self.set(&format!("{}%-", delta))
    }

    fn toggle_mute(&mut self) -> Result<(), BackendError> {
        self.set("toggle")
    }

    fn list_devices(&self) -> Result<Vec<Device>, BackendError> {
        let output = self.runner.output(&[self.pcm_lister(), "-L"])?;
        Ok(parse_pcm_listing(&output))
    }

    fn swap_device(&mut self, device: &Device) -> Result<(), BackendError> {
        self.device = device.name.clone();
        self.card = None;
        info!(device = %self.device, "amixer now targets device");
        Ok(())
    }
}

/// First `[NN%] ... [on|off]` line of `amixer sget` output
pub(crate) fn parse_volume(output: &str) -> VolumeState {
    static VOLUME: OnceLock<Regex> = OnceLock::new();
    let re = VOLUME
        .get_or_init(|| Regex::new(r"\[(\d{1,3})%\].*\[(\w{2,3})\]").expect("valid regex"));

    match re.captures(output) {
        Some(caps) => match caps[1].parse() {
            Ok(perc) => VolumeState::new(perc, &caps[2] == "off"),
            Err(_) => VolumeState::unknown(),
        },
        None => VolumeState::unknown(),
    }
}

/// PCM names from `aplay -L`; descriptions are the indented lines
pub(crate) fn parse_pcm_listing(output: &str) -> Vec<Device> {
    output
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(char::is_whitespace))
        .map(|name| Device::new(name.trim(), name.trim(), DeviceState::Unknown))
        .collect()
}
