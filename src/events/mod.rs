//! Click events from the status bar
//!
//! The bar reports clicks as JSON objects carrying the block name and the
//! mouse button number. Buttons are mapped to [`ClickAction`]s through a
//! configurable [`ButtonMap`].

use serde::Deserialize;

/// A click on one of our blocks
///
/// Only the fields used for dispatch are decoded, the rest of the object is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClickEvent {
    /// Block name the click was aimed at
    #[serde(default)]
    pub name: Option<String>,

    /// X11 button number (1 left, 2 middle, 3 right, 4/5 scroll)
    pub button: u8,
}

/// What a click asks the widget to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Enter or leave device selection
    ToggleEditMode,
    /// Flip the mute state of the working device
    ToggleMute,
    /// Scroll towards lower list indices
    ScrollUp,
    /// Scroll towards higher list indices
    ScrollDown,
}

impl std::fmt::Display for ClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClickAction::ToggleEditMode => write!(f, "TOGGLE_EDIT_MODE"),
            ClickAction::ToggleMute => write!(f, "TOGGLE_MUTE"),
            ClickAction::ScrollUp => write!(f, "SCROLL_UP"),
            ClickAction::ScrollDown => write!(f, "SCROLL_DOWN"),
        }
    }
}

/// Button numbers bound to each action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMap {
    pub edit: u8,
    pub mute: u8,
    pub scroll_up: u8,
    pub scroll_down: u8,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            edit: 1,
            mute: 3,
            scroll_up: 4,
            scroll_down: 5,
        }
    }
}

impl ButtonMap {
    /// Action bound to `button`, edit and mute take precedence over scrolling
    pub fn action_for(&self, button: u8) -> Option<ClickAction> {
        if button == self.edit {
            Some(ClickAction::ToggleEditMode)
        } else if button == self.mute {
            Some(ClickAction::ToggleMute)
        } else if button == self.scroll_up {
            Some(ClickAction::ScrollUp)
        } else if button == self.scroll_down {
            Some(ClickAction::ScrollDown)
        } else {
            None
        }
    }
}
