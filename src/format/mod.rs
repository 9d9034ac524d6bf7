//! Volume text and color
//!
//! Maps a [`VolumeState`] to the block text and color: a glyph from the
//! volume ramp, a color picked from ascending thresholds, and one of two
//! templates depending on the mute state.

mod template;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::backend::VolumeState;

pub use template::render;

/// Text shown instead of the percentage when it could not be read
pub const UNKNOWN_MARKER: &str = "?";

/// A `(threshold, label)` pair; the label is a color or a palette name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold {
    pub value: u32,
    pub label: String,
}

impl Threshold {
    pub fn new(value: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid threshold `{0}`, expected <percent>:<label>")]
pub struct ThresholdParseError(String);

impl FromStr for Threshold {
    type Err = ThresholdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, label) = s
            .split_once(':')
            .ok_or_else(|| ThresholdParseError(s.to_string()))?;
        let value = value
            .trim()
            .parse()
            .map_err(|_| ThresholdParseError(s.to_string()))?;
        let label = label.trim();
        if label.is_empty() {
            return Err(ThresholdParseError(s.to_string()));
        }
        Ok(Threshold::new(value, label))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.label)
    }
}

/// Colors behind the `good`, `degraded` and `bad` labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub good: String,
    pub degraded: String,
    pub bad: String,
    pub muted: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            good: "#00FF00".to_string(),
            degraded: "#FFFF00".to_string(),
            bad: "#FF0000".to_string(),
            muted: "#FF0000".to_string(),
        }
    }
}

impl Palette {
    /// Resolve a threshold label; anything that is not a palette name is
    /// passed through as a literal color
    pub fn resolve(&self, label: &str) -> String {
        match label {
            "good" => self.good.clone(),
            "degraded" => self.degraded.clone(),
            "bad" => self.bad.clone(),
            other => other.to_string(),
        }
    }
}

/// Final text and color of the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub full_text: String,
    pub color: Option<String>,
}

/// Index into a ramp of `ramp_len` glyphs for `percentage`
///
/// `min(L-1, ceil(p / 100 * (L-1)))`, computed in integers.
pub fn glyph_index(percentage: u32, ramp_len: usize) -> usize {
    let last = ramp_len.saturating_sub(1);
    let scaled = (percentage as usize * last).div_ceil(100);
    scaled.min(last)
}

/// Label of the highest threshold not above `percentage`, falling back to
/// the lowest tier
pub fn threshold_label(percentage: u32, thresholds: &[Threshold]) -> Option<&str> {
    thresholds
        .iter()
        .rev()
        .find(|t| t.value <= percentage)
        .or_else(|| thresholds.first())
        .map(|t| t.label.as_str())
}

/// Renders volume states with the configured ramp, thresholds and templates
#[derive(Debug, Clone)]
pub struct VolumeFormatter {
    blocks: Vec<char>,
    thresholds: Vec<Threshold>,
    format: String,
    format_muted: String,
    palette: Palette,
}

impl VolumeFormatter {
    pub fn new(
        blocks: &str,
        thresholds: Vec<Threshold>,
        format: impl Into<String>,
        format_muted: impl Into<String>,
        palette: Palette,
    ) -> Self {
        Self {
            blocks: blocks.chars().collect(),
            thresholds,
            format: format.into(),
            format_muted: format_muted.into(),
            palette,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Render `state`; `sink_name` is only passed while in edit mode
    pub fn render(&self, state: &VolumeState, sink_name: Option<&str>) -> Rendered {
        let mut values: HashMap<&str, String> = HashMap::new();
        if let Some(name) = sink_name {
            values.insert("sink_name", name.to_string());
        }

        let (template, color) = match (state.percentage, state.muted) {
            (None, _) => {
                values.insert("percentage", UNKNOWN_MARKER.to_string());
                (&self.format, None)
            }
            (Some(perc), Some(true)) => {
                values.insert("percentage", perc.to_string());
                (&self.format_muted, Some(self.palette.muted.clone()))
            }
            (Some(perc), _) => {
                values.insert("percentage", perc.to_string());
                if let Some(glyph) = self.blocks.get(glyph_index(perc, self.blocks.len())) {
                    values.insert("icon", glyph.to_string());
                }
                let color = threshold_label(perc, &self.thresholds).map(|l| self.palette.resolve(l));
                (&self.format, color)
            }
        };

        Rendered {
            full_text: render(template, &values),
            color,
        }
    }
}
