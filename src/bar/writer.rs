//! Streaming writer for the block array

use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::protocol::{Block, Header};

/// Writes the header once and then one block array per update
pub struct BarWriter<W> {
    out: W,
    started: bool,
}

impl<W: AsyncWrite + Unpin> BarWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            started: false,
        }
    }

    /// Send the protocol header and open the endless array
    pub async fn start(&mut self) -> Result<()> {
        let header = serde_json::to_string(&Header::default())?;
        self.out.write_all(header.as_bytes()).await?;
        self.out.write_all(b"\n[\n").await?;
        self.out.flush().await?;
        self.started = true;
        Ok(())
    }

    /// Send one update, opening the stream first if needed
    pub async fn send(&mut self, block: &Block) -> Result<()> {
        if !self.started {
            self.start().await?;
        }
        let line = serde_json::to_string(&[block])?;
        trace!(%line, "sending update");
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b",\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
