//! Snapshot of the device listing used for cycling

use super::{AudioBackend, BackendError, Device, DeviceState};

/// Devices as listed by the backend at one point in time
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Take a fresh snapshot from the backend
    pub fn enumerate(backend: &dyn AudioBackend) -> Result<Self, BackendError> {
        Ok(Self::new(backend.list_devices()?))
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Listing position of the device called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.devices.iter().position(|d| d.name == name)
    }

    /// Next device after `from` in direction `step` that is not suspended
    ///
    /// Wraps around the listing and looks at every other device at most once,
    /// so a listing where everything else is suspended yields `None`.
    pub fn next_eligible(&self, from: usize, step: isize) -> Option<usize> {
        let count = self.devices.len();
        if count == 0 || from >= count {
            return None;
        }

        let count_i = count as isize;
        (1..count_i)
            .map(|hop| (from as isize + step * hop).rem_euclid(count_i) as usize)
            .find(|&i| self.devices[i].state != DeviceState::Suspended)
    }
}
