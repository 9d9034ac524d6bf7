//! Process lifecycle

mod signals;

pub use signals::{SignalAction, Signals};
