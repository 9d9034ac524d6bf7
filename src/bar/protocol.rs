//! i3bar protocol message definitions
//!
//! The block writes a header object, then an endless JSON array whose
//! elements are arrays of blocks. Clicks arrive on stdin as an endless array
//! of click objects, one per line.

use serde::Serialize;

use crate::events::ClickEvent;

/// First line written to the bar
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub version: u32,
    pub click_events: bool,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: 1,
            click_events: true,
        }
    }
}

/// One status block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    pub full_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Parse one stdin line of the click stream
///
/// Returns `None` for the opening `[`, blank lines and anything that is not
/// a click object.
pub fn parse_click_line(line: &str) -> Option<ClickEvent> {
    let line = line.trim();
    let line = line.strip_prefix(',').unwrap_or(line).trim_start();
    if line.is_empty() || line == "[" {
        return None;
    }
    serde_json::from_str(line).ok()
}
