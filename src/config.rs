//! Configuration loading and management

use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::backend::BackendOptions;
use crate::events::ButtonMap;
use crate::format::{Palette, Threshold, VolumeFormatter};

/// Volume block for i3bar/swaybar
#[derive(Debug, Clone, Parser)]
#[command(name = "mixer-status")]
#[command(version)]
#[command(subcommand_required = false)]
pub struct Config {
    #[command(subcommand)]
    pub action: Option<Action>,

    /// Mixer tool to use: amixer, pamixer or pactl (detected when omitted)
    #[arg(long)]
    pub command: Option<String>,

    /// Sound card (amixer only)
    #[arg(long)]
    pub card: Option<String>,

    /// Mixer channel (amixer only, default Master or Capture)
    #[arg(long)]
    pub channel: Option<String>,

    /// Device to control (see `aplay -L`, `pactl list short sinks`, `pamixer --list-sinks`)
    #[arg(long)]
    pub device: Option<String>,

    /// Control an input device instead of an output device
    #[arg(long)]
    pub is_input: bool,

    /// Ceiling for volume increases, may exceed 100 with pactl and pamixer
    #[arg(long, default_value_t = 120)]
    pub max_volume: u32,

    /// Percent step for volume changes
    #[arg(long, default_value_t = 5)]
    pub volume_delta: u32,

    /// Seconds between refreshes
    #[arg(long, default_value_t = 10)]
    pub cache_timeout: u64,

    /// Glyph ramp, one character per volume level
    #[arg(long, default_value = "_▁▂▃▄▅▆▇█")]
    pub blocks: String,

    /// Ascending `<percent>:<label>` pairs; labels are good/degraded/bad or colors
    #[arg(long, value_delimiter = ',', default_value = "0:bad,20:degraded,50:good")]
    pub thresholds: Vec<Threshold>,

    /// Template with {icon}, {percentage} and {sink_name}; [..] is optional
    #[arg(long, default_value = "♪[ {icon}] {percentage}%[ - {sink_name}]")]
    pub format: String,

    /// Template used while muted
    #[arg(long, default_value = "♪ muted[ - {sink_name}]")]
    pub format_muted: String,

    /// Button that enters and leaves device selection
    #[arg(long, default_value_t = 1)]
    pub button_edit: u8,

    /// Button that toggles mute
    #[arg(long, default_value_t = 3)]
    pub button_mute: u8,

    #[arg(long, default_value_t = 4)]
    pub button_scroll_up: u8,

    #[arg(long, default_value_t = 5)]
    pub button_scroll_down: u8,

    /// Scroll changes the volume when not selecting a device
    #[arg(long)]
    pub scroll_volume: bool,

    #[arg(long, default_value = "#00FF00")]
    pub color_good: String,

    #[arg(long, default_value = "#FFFF00")]
    pub color_degraded: String,

    #[arg(long, default_value = "#FF0000")]
    pub color_bad: String,

    /// Color while muted, defaults to the bad color
    #[arg(long)]
    pub color_muted: Option<String>,

    /// Block name reported to the bar
    #[arg(long, default_value = "volume")]
    pub name: String,
}

/// One-shot commands, the bar loop runs when none is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Print the current block as JSON and exit
    Status,
    /// Raise the volume by the configured step
    Up,
    /// Lower the volume by the configured step
    Down,
    /// Toggle mute
    Mute,
    /// List devices of the configured kind
    Devices,
}

impl Config {
    /// Load configuration from the command line
    pub fn load() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the widget cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            bail!("blocks must contain at least one glyph");
        }
        if self.thresholds.is_empty() {
            bail!("at least one threshold is required");
        }
        if self
            .thresholds
            .windows(2)
            .any(|w| w[0].value > w[1].value)
        {
            bail!("thresholds must be sorted ascending");
        }
        if self.volume_delta == 0 {
            bail!("volume_delta must be positive");
        }
        if self.max_volume == 0 {
            bail!("max_volume must be positive");
        }
        Ok(())
    }

    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            card: self.card.clone(),
            channel: self.channel.clone(),
            device: self.device.clone(),
            is_input: self.is_input,
            max_volume: self.max_volume,
        }
    }

    pub fn buttons(&self) -> ButtonMap {
        ButtonMap {
            edit: self.button_edit,
            mute: self.button_mute,
            scroll_up: self.button_scroll_up,
            scroll_down: self.button_scroll_down,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette {
            good: self.color_good.clone(),
            degraded: self.color_degraded.clone(),
            bad: self.color_bad.clone(),
            muted: self
                .color_muted
                .clone()
                .unwrap_or_else(|| self.color_bad.clone()),
        }
    }

    pub fn formatter(&self) -> VolumeFormatter {
        VolumeFormatter::new(
            &self.blocks,
            self.thresholds.clone(),
            self.format.clone(),
            self.format_muted.clone(),
            self.palette(),
        )
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("mixer-status").chain(args.iter().copied());
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = parse(&[]);
        assert!(config.validate().is_ok());
        assert_eq!(config.action, None);
        assert_eq!(config.max_volume, 120);
        assert_eq!(config.volume_delta, 5);
        assert_eq!(config.blocks.chars().count(), 9);
        assert_eq!(
            config.thresholds,
            vec![
                Threshold::new(0, "bad"),
                Threshold::new(20, "degraded"),
                Threshold::new(50, "good"),
            ]
        );
        assert_eq!(config.buttons(), ButtonMap::default());
        assert_eq!(config.palette().muted, "#FF0000");
    }

    #[test]
    fn test_config_overrides() {
        let config = parse(&[
            "--command",
            "pactl",
            "--is-input",
            "--thresholds",
            "0:#FF0000,10:#E2571E",
            "--color-muted",
            "#888888",
            "up",
        ]);
        assert_eq!(config.command.as_deref(), Some("pactl"));
        assert!(config.backend_options().is_input);
        assert_eq!(config.thresholds[1], Threshold::new(10, "#E2571E"));
        assert_eq!(config.palette().muted, "#888888");
        assert_eq!(config.action, Some(Action::Up));
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        let result = Config::try_parse_from(["mixer-status", "--thresholds", "loud"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_unsorted_thresholds() {
        let config = parse(&["--thresholds", "50:good,20:bad"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_blocks() {
        let config = parse(&["--blocks", ""]);
        assert!(config.validate().is_err());
    }
}
