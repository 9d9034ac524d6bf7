//! The volume block: periodic query and click dispatch

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::{AudioBackend, BackendError, Device};
use crate::bar::Block;
use crate::events::{ButtonMap, ClickAction, ClickEvent};
use crate::format::{Rendered, VolumeFormatter};
use crate::state::EditModeController;

/// Result of one query: the block to draw and when to query again
#[derive(Debug, Clone)]
pub struct Output {
    pub block: Block,
    pub cached_until: Instant,
}

pub struct VolumeWidget {
    name: String,
    backend: Box<dyn AudioBackend>,
    controller: EditModeController,
    formatter: VolumeFormatter,
    buttons: ButtonMap,
    cache_timeout: Duration,
}

impl VolumeWidget {
    pub fn new(
        name: impl Into<String>,
        backend: Box<dyn AudioBackend>,
        controller: EditModeController,
        formatter: VolumeFormatter,
        buttons: ButtonMap,
        cache_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            backend,
            controller,
            formatter,
            buttons,
            cache_timeout,
        }
    }

    /// Direct access for one-shot commands that bypass the click mapping
    pub fn backend_mut(&mut self) -> &mut dyn AudioBackend {
        self.backend.as_mut()
    }

    /// Read live state and render it
    ///
    /// Unparseable tool output renders as unknown; a failing command is shown
    /// in the block text so the user sees what broke.
    pub fn query(&self) -> Output {
        let rendered = match self.backend.volume() {
            Ok(state) => {
                debug!(?state, "queried volume");
                self.formatter.render(&state, self.controller.sink_name())
            }
            Err(e) => {
                warn!(error = %e, "volume query failed");
                Rendered {
                    full_text: format!("{}: {}", self.name, e),
                    color: Some(self.formatter.palette().bad.clone()),
                }
            }
        };

        Output {
            block: Block {
                name: self.name.clone(),
                instance: Some(self.backend.choice().to_string()),
                full_text: rendered.full_text,
                color: rendered.color,
            },
            cached_until: Instant::now() + self.cache_timeout,
        }
    }

    /// Dispatch a click aimed at this block; returns whether it was handled
    pub fn on_click(&mut self, event: &ClickEvent) -> Result<bool, BackendError> {
        if event.name.as_deref().is_some_and(|n| n != self.name) {
            return Ok(false);
        }
        let Some(action) = self.buttons.action_for(event.button) else {
            debug!(button = event.button, "unbound button");
            return Ok(false);
        };
        self.apply(action)?;
        Ok(true)
    }

    pub fn apply(&mut self, action: ClickAction) -> Result<(), BackendError> {
        self.controller.handle(action, self.backend.as_mut())
    }

    pub fn devices(&self) -> Result<Vec<Device>, BackendError> {
        self.backend.list_devices()
    }
}
