use super::{MessageSink, OutboundMessage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Writes each payload to stdout as a single JSON line.
pub struct ConsoleSink;

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        let mut line = serde_json::to_string(&message).context("Failed to encode message")?;
        line.push('\n');

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .context("Failed to write to stdout")?;
        stdout.flush().await.context("Failed to flush stdout")?;
        Ok(())
    }
}
