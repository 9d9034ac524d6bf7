//! mixer-status: volume block for i3bar and swaybar
//!
//! Drives an external mixer tool (amixer, pamixer or pactl) and provides:
//! - A volume/mute readout rendered through a glyph ramp and thresholds
//! - Click handling: mute toggle and an edit mode for cycling devices
//! - One-shot subcommands for keybindings
//!
//! Every refresh re-reads the live state from the tool; nothing is cached.

mod backend;
mod bar;
mod command;
mod config;
mod events;
mod format;
mod lifecycle;
mod state;
mod widget;

use std::rc::Rc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::bar::{parse_click_line, BarWriter};
use crate::command::{CommandRunner, SystemRunner};
use crate::config::{Action, Config};
use crate::lifecycle::{SignalAction, Signals};
use crate::state::EditModeController;
use crate::widget::VolumeWidget;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the bar protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "mixer-status starting"
    );

    let config = Config::load()?;

    let runner: Rc<dyn CommandRunner> = Rc::new(SystemRunner::new());
    let choice = backend::selector::select(config.command.as_deref(), |program| {
        runner.is_installed(program)
    })?;
    let backend = backend::build(choice, Rc::clone(&runner), config.backend_options())
        .with_context(|| format!("failed to initialize {} backend", choice))?;

    let mut controller = EditModeController::new();
    if config.scroll_volume {
        controller = controller.with_scroll_volume(config.volume_delta);
    }

    let mut widget = VolumeWidget::new(
        config.name.clone(),
        backend,
        controller,
        config.formatter(),
        config.buttons(),
        config.cache_timeout(),
    );

    match config.action {
        None => run_bar(widget).await?,
        Some(Action::Status) => {
            println!("{}", serde_json::to_string(&widget.query().block)?);
        }
        Some(Action::Up) => widget.backend_mut().volume_up(config.volume_delta)?,
        Some(Action::Down) => widget.backend_mut().volume_down(config.volume_delta)?,
        Some(Action::Mute) => widget.backend_mut().toggle_mute()?,
        Some(Action::Devices) => {
            for device in widget.devices()? {
                println!("{}\t{}\t{}", device.id, device.name, device.state);
            }
        }
    }

    Ok(())
}

/// Main event loop: redraw on deadline, click or SIGUSR1 until shut down
async fn run_bar(mut widget: VolumeWidget) -> Result<()> {
    let mut signals = Signals::new().context("failed to register signal handlers")?;
    let mut writer = BarWriter::new(tokio::io::stdout());
    writer.start().await.context("failed to write bar header")?;

    let mut clicks = BufReader::new(tokio::io::stdin()).lines();
    let mut clicks_open = true;

    info!("entering main loop");

    loop {
        let output = widget.query();
        writer
            .send(&output.block)
            .await
            .context("failed to write block")?;

        tokio::select! {
            _ = tokio::time::sleep_until(output.cached_until) => {}

            line = clicks.next_line(), if clicks_open => match line {
                Ok(Some(line)) => {
                    if let Some(event) = parse_click_line(&line) {
                        if let Err(e) = widget.on_click(&event) {
                            warn!(error = %e, button = event.button, "click handling failed");
                        }
                    }
                }
                Ok(None) => {
                    info!("click stream closed");
                    clicks_open = false;
                }
                Err(e) => {
                    warn!(?e, "failed to read click stream");
                    clicks_open = false;
                }
            },

            action = signals.recv() => match action {
                SignalAction::Shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                SignalAction::Refresh => {}
            },
        }
    }

    info!("mixer-status stopped");
    Ok(())
}
