//! State machine module for device selection
//!
//! Provides an explicit state machine with two modes:
//! - Normal: primary click enters edit mode, secondary click toggles mute
//! - Edit: scrolling cycles the working device, primary click leaves

mod machine;

pub use machine::EditModeController;
