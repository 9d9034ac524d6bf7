//! Edit mode state machine
//!
//! Handles transitions between Normal and Edit mode based on click actions,
//! and cycles the working device while in Edit mode.

use tracing::{debug, info, warn};

use crate::backend::{AudioBackend, BackendError, DeviceRegistry};
use crate::events::ClickAction;

/// The two modes of the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Clicks toggle mute, scrolling does nothing
    #[default]
    Normal,
    /// Scrolling cycles through devices
    Edit,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Normal => write!(f, "Normal"),
            Mode::Edit => write!(f, "Edit"),
        }
    }
}

/// Selection state kept for the lifetime of the widget
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditModeState {
    /// Edit mode is on
    pub active: bool,
    /// Name of the device targeted by cycling; kept when edit mode ends
    pub selected: Option<String>,
}

/// The state machine that owns [`EditModeState`]
#[derive(Debug, Default)]
pub struct EditModeController {
    state: EditModeState,
    /// Volume step used by scrolling outside edit mode, `None` disables it
    scroll_volume: Option<u32>,
}

impl EditModeController {
    /// Create a controller in Normal mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Let scrolling change the volume while not in edit mode
    pub fn with_scroll_volume(mut self, delta: u32) -> Self {
        self.scroll_volume = Some(delta);
        self
    }

    /// Get the current mode
    pub fn mode(&self) -> Mode {
        if self.state.active {
            Mode::Edit
        } else {
            Mode::Normal
        }
    }

    /// Device name to show next to the volume, only while editing
    pub fn sink_name(&self) -> Option<&str> {
        if self.state.active {
            self.state.selected.as_deref()
        } else {
            None
        }
    }

    /// Apply one click action
    pub fn handle(
        &mut self,
        action: ClickAction,
        backend: &mut dyn AudioBackend,
    ) -> Result<(), BackendError> {
        debug!(%action, mode = %self.mode(), "handling click");

        match (action, self.mode()) {
            (ClickAction::ToggleMute, _) => backend.toggle_mute(),
            (ClickAction::ToggleEditMode, Mode::Normal) => self.enter_edit_mode(backend),
            (ClickAction::ToggleEditMode, Mode::Edit) => {
                self.transition_to(Mode::Normal);
                Ok(())
            }
            (ClickAction::ScrollUp, Mode::Edit) => self.cycle(-1, backend),
            (ClickAction::ScrollDown, Mode::Edit) => self.cycle(1, backend),
            (ClickAction::ScrollUp, Mode::Normal) => match self.scroll_volume {
                Some(delta) => backend.volume_up(delta),
                None => Ok(()),
            },
            (ClickAction::ScrollDown, Mode::Normal) => match self.scroll_volume {
                Some(delta) => backend.volume_down(delta),
                None => Ok(()),
            },
        }
    }

    /// Capture the default device by name, then switch to Edit
    fn enter_edit_mode(&mut self, backend: &mut dyn AudioBackend) -> Result<(), BackendError> {
        let name = backend.default_device(true)?;
        self.state.selected = Some(name);
        self.transition_to(Mode::Edit);
        Ok(())
    }

    /// Move the selection `step` positions, skipping suspended devices
    fn cycle(&mut self, step: isize, backend: &mut dyn AudioBackend) -> Result<(), BackendError> {
        match self.try_cycle(step, backend) {
            Err(BackendError::DeviceNotFound { kind, looked_for }) => {
                warn!(kind, ?looked_for, "selected device vanished, ignoring scroll");
                Ok(())
            }
            other => other,
        }
    }

    fn try_cycle(&mut self, step: isize, backend: &mut dyn AudioBackend) -> Result<(), BackendError> {
        let Some(selected) = self.state.selected.clone() else {
            debug!("nothing selected, ignoring scroll");
            return Ok(());
        };

        let registry = DeviceRegistry::enumerate(backend)?;
        let Some(current) = registry.position(&selected) else {
            debug!(%selected, "selection not in device list, ignoring scroll");
            return Ok(());
        };

        let Some(device) = registry
            .next_eligible(current, step)
            .and_then(|i| registry.get(i))
        else {
            debug!(%selected, "no other device available");
            return Ok(());
        };

        info!(from = %selected, to = %device.name, "cycling device");
        backend.swap_device(device)?;
        self.state.selected = Some(device.name.clone());
        Ok(())
    }

    /// Perform a mode transition
    fn transition_to(&mut self, new_mode: Mode) {
        let old_mode = self.mode();
        self.state.active = new_mode == Mode::Edit;

        info!(
            from = %old_mode,
            to = %new_mode,
            selected = ?self.state.selected,
            "edit mode transition"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::backend::fake::FakeBackend;
    use crate::backend::{BackendOptions, PamixerBackend};
    use crate::command::mock::MockRunner;
    use crate::backend::DeviceState::{Idle, Running, Suspended};

    fn editing(backend: &mut FakeBackend) -> EditModeController {
        let mut ctl = EditModeController::new();
        ctl.handle(ClickAction::ToggleEditMode, backend).unwrap();
        ctl
    }

    #[test]
    fn test_initial_state() {
        let ctl = EditModeController::new();
        assert_eq!(ctl.mode(), Mode::Normal);
        assert_eq!(ctl.sink_name(), None);
    }

    #[test]
    fn test_normal_to_edit_captures_default() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Idle)]);
        let ctl = editing(&mut backend);
        assert_eq!(ctl.mode(), Mode::Edit);
        assert_eq!(ctl.sink_name(), Some("A"));
    }

    #[test]
    fn test_edit_to_normal_keeps_selection() {
        let mut backend = FakeBackend::with_devices(&[("A", Running)]);
        let mut ctl = editing(&mut backend);
        ctl.handle(ClickAction::ToggleEditMode, &mut backend).unwrap();
        assert_eq!(ctl.mode(), Mode::Normal);
        assert_eq!(ctl.sink_name(), None);
        assert_eq!(ctl.state.selected.as_deref(), Some("A"));
    }

    #[test]
    fn test_enter_fails_without_default() {
        let mut backend = FakeBackend::default();
        let mut ctl = EditModeController::new();
        let result = ctl.handle(ClickAction::ToggleEditMode, &mut backend);
        assert!(matches!(result, Err(BackendError::DeviceNotFound { .. })));
        assert_eq!(ctl.mode(), Mode::Normal);
    }

    #[test]
    fn test_scroll_down_skips_suspended() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Suspended), ("C", Running)]);
        let mut ctl = editing(&mut backend);

        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();

        assert_eq!(ctl.sink_name(), Some("C"));
        assert_eq!(backend.swapped_to, vec!["C"]);
    }

    #[test]
    fn test_scroll_up_wraps() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Suspended), ("C", Idle)]);
        let mut ctl = editing(&mut backend);

        ctl.handle(ClickAction::ScrollUp, &mut backend).unwrap();
        assert_eq!(ctl.sink_name(), Some("C"));

        ctl.handle(ClickAction::ScrollUp, &mut backend).unwrap();
        assert_eq!(ctl.sink_name(), Some("A"));
        assert_eq!(backend.swapped_to, vec!["C", "A"]);
    }

    #[test]
    fn test_all_others_suspended_is_noop() {
        let mut backend =
            FakeBackend::with_devices(&[("A", Running), ("B", Suspended), ("C", Suspended)]);
        let mut ctl = editing(&mut backend);

        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();
        ctl.handle(ClickAction::ScrollUp, &mut backend).unwrap();

        assert_eq!(ctl.sink_name(), Some("A"));
        assert!(backend.swapped_to.is_empty());
    }

    #[test]
    fn test_stale_selection_is_noop() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Running)]);
        let mut ctl = editing(&mut backend);
        backend.devices.remove(0);

        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();

        assert_eq!(ctl.sink_name(), Some("A"));
        assert!(backend.swapped_to.is_empty());
    }

    #[test]
    fn test_failed_swap_keeps_selection() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Running)]);
        let mut ctl = editing(&mut backend);
        backend.fail_swap = true;

        let result = ctl.handle(ClickAction::ScrollDown, &mut backend);

        assert!(matches!(result, Err(BackendError::Command(_))));
        assert_eq!(ctl.sink_name(), Some("A"));
    }

    #[test]
    fn test_pamixer_reentry_shows_working_sink() {
        let runner = Rc::new(
            MockRunner::new()
                .with_output("pamixer --get-default-sink", "Default sink:\n0 \"A\" \"Built-in\"\n")
                .with_output(
                    "pamixer --list-sinks",
                    "Sinks:\n0 \"A\" \"Running\" \"Built-in\"\n3 \"B\" \"Idle\" \"Headset\"\n",
                ),
        );
        let mut backend = PamixerBackend::new(runner.clone(), BackendOptions::default());
        let mut ctl = EditModeController::new();

        ctl.handle(ClickAction::ToggleEditMode, &mut backend).unwrap();
        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();
        assert_eq!(ctl.sink_name(), Some("B"));

        ctl.handle(ClickAction::ToggleEditMode, &mut backend).unwrap();
        ctl.handle(ClickAction::ToggleEditMode, &mut backend).unwrap();
        ctl.handle(ClickAction::ToggleMute, &mut backend).unwrap();

        assert_eq!(ctl.sink_name(), Some("B"));
        assert_eq!(
            runner.mutations(),
            vec!["pamixer --allow-boost --sink 3 --toggle-mute"]
        );
    }

    #[test]
    fn test_scroll_in_normal_mode_does_nothing() {
        let mut backend = FakeBackend::with_devices(&[("A", Running), ("B", Running)]);
        let mut ctl = EditModeController::new();

        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();
        ctl.handle(ClickAction::ScrollUp, &mut backend).unwrap();

        assert!(backend.swapped_to.is_empty());
        assert!(backend.ups.is_empty());
        assert!(backend.downs.is_empty());
    }

    #[test]
    fn test_scroll_volume_in_normal_mode() {
        let mut backend = FakeBackend::with_devices(&[("A", Running)]);
        let mut ctl = EditModeController::new().with_scroll_volume(5);

        ctl.handle(ClickAction::ScrollUp, &mut backend).unwrap();
        ctl.handle(ClickAction::ScrollDown, &mut backend).unwrap();

        assert_eq!(backend.ups, vec![5]);
        assert_eq!(backend.downs, vec![5]);
    }

    #[test]
    fn test_mute_in_any_mode() {
        let mut backend = FakeBackend::with_devices(&[("A", Running)]);
        let mut ctl = EditModeController::new();

        ctl.handle(ClickAction::ToggleMute, &mut backend).unwrap();
        ctl.handle(ClickAction::ToggleEditMode, &mut backend).unwrap();
        ctl.handle(ClickAction::ToggleMute, &mut backend).unwrap();

        assert_eq!(backend.mute_toggles, 2);
        assert_eq!(ctl.mode(), Mode::Edit);
    }
}
