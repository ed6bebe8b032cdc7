//! Telegram sink using the Bot API sendMessage endpoint.

use crate::message::AlertMessage;
use crate::sink::{AlertError, AlertSink};
use async_trait::async_trait;
use tracing::debug;

/// Sink that posts alerts to a Telegram chat.
pub struct TelegramSink {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramSink {
    /// Create a sink for the given bot token and chat.
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            client: reqwest::Client::new(),
        }
    }

    /// Create from TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID environment
    /// variables. Returns None when either is missing or empty.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;

        if bot_token.is_empty() || chat_id.is_empty() {
            return None;
        }

        Some(Self::new(bot_token, chat_id))
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, message: &AlertMessage) -> Result<(), AlertError> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let text = format!("{}\n\n{}", message.subject, message.body);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text.as_str()),
                ("disable_web_page_preview", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AlertError::Api(response.status().as_u16()));
        }

        debug!(chat_id = %self.chat_id, "Telegram alert delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_both_variables() {
        // Env vars are process-global, so keep every case in one test
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
        assert!(TelegramSink::from_env().is_none());

        std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        assert!(TelegramSink::from_env().is_none());

        std::env::set_var("TELEGRAM_CHAT_ID", "");
        assert!(TelegramSink::from_env().is_none());

        std::env::set_var("TELEGRAM_CHAT_ID", "42");
        let sink = TelegramSink::from_env().unwrap();
        assert_eq!(sink.name(), "telegram");

        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }
}
