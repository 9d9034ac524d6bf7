//! In-memory backend for tests of the layers above the mixer tools

use super::{
    AudioBackend, BackendChoice, BackendError, CommandError, Device, DeviceKind, DeviceState,
    VolumeState,
};

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub devices: Vec<Device>,
    pub default_name: Option<String>,
    pub volume: VolumeState,
    pub swapped_to: Vec<String>,
    pub mute_toggles: usize,
    pub ups: Vec<u32>,
    pub downs: Vec<u32>,
    /// Make `swap_device` fail as if the tool exited non-zero
    pub fail_swap: bool,
}

impl FakeBackend {
    /// Devices named after `states`, the first one being the default
    pub fn with_devices(states: &[(&str, DeviceState)]) -> Self {
        let devices: Vec<Device> = states
            .iter()
            .enumerate()
            .map(|(i, (name, state))| Device::new(i.to_string(), *name, *state))
            .collect();
        Self {
            default_name: devices.first().map(|d| d.name.clone()),
            devices,
            ..Default::default()
        }
    }
}

impl AudioBackend for FakeBackend {
    fn choice(&self) -> BackendChoice {
        BackendChoice::Pactl
    }

    fn default_device(&self, by_name: bool) -> Result<String, BackendError> {
        let name = self
            .default_name
            .clone()
            .ok_or_else(|| BackendError::not_found(DeviceKind::Sink, None))?;
        if by_name {
            return Ok(name);
        }
        self.devices
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.clone())
            .ok_or_else(|| BackendError::not_found(DeviceKind::Sink, Some(&name)))
    }

    fn volume(&self) -> Result<VolumeState, BackendError> {
        Ok(self.volume)
    }

    fn volume_up(&mut self, delta: u32) -> Result<(), BackendError> {
        self.ups.push(delta);
        Ok(())
    }

    fn volume_down(&mut self, delta: u32) -> Result<(), BackendError> {
        self.downs.push(delta);
        Ok(())
    }

    fn toggle_mute(&mut self) -> Result<(), BackendError> {
        self.mute_toggles += 1;
        Ok(())
    }

    fn list_devices(&self) -> Result<Vec<Device>, BackendError> {
        Ok(self.devices.clone())
    }

    fn swap_device(&mut self, device: &Device) -> Result<(), BackendError> {
        if self.fail_swap {
            return Err(CommandError::Failed {
                argv: format!("swap {}", device.id),
                code: Some(1),
                stdout: String::new(),
            }
            .into());
        }
        self.swapped_to.push(device.name.clone());
        self.default_name = Some(device.name.clone());
        Ok(())
    }
}
