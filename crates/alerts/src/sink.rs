//! Alert delivery trait and the terminal fallback sink.

use crate::message::AlertMessage;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),

    #[error("alert API returned status {0}")]
    Api(u16),
}

impl From<reqwest::Error> for AlertError {
    fn from(err: reqwest::Error) -> Self {
        AlertError::Delivery(err.to_string())
    }
}

/// Something that can deliver an alert message.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one message. Failures are reported, never retried here.
    async fn deliver(&self, message: &AlertMessage) -> Result<(), AlertError>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}

/// Sink that writes alerts to the log. Used when no transport is configured.
pub struct TerminalSink;

#[async_trait]
impl AlertSink for TerminalSink {
    async fn deliver(&self, message: &AlertMessage) -> Result<(), AlertError> {
        info!("📢 {}", message.subject);
        for line in message.body.lines() {
            info!("  {}", line);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
