// src/platforms/telegram.rs

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Messaging, TransportError};

const API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client. All outbound traffic from the engagement core
/// goes through this one surface.
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramApi {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/bot{}", API_BASE, bot_token),
        }
    }

    /// For tests and self-hosted Bot API servers.
    pub fn with_base_url(bot_token: &str, base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/bot{}", base, bot_token),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TransportError> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;

        // 403 means the recipient blocked the bot; terminal for them,
        // non-fatal for the batch.
        if resp.status() == StatusCode::FORBIDDEN {
            return Err(TransportError::Blocked);
        }

        let status = resp.status();
        let parsed: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;

        if !parsed.ok {
            let desc = parsed.description.unwrap_or_else(|| status.to_string());
            debug!("Telegram API {} failed: {}", method, desc);
            return Err(TransportError::Other(desc));
        }

        parsed
            .result
            .ok_or_else(|| TransportError::Other(format!("{}: empty result", method)))
    }
}

#[async_trait::async_trait]
impl Messaging for TelegramApi {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TransportError> {
        let sent: SentMessage = self
            .call(
                "sendMessage",
                json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" }),
            )
            .await?;
        Ok(sent.message_id)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                    "parse_mode": "HTML"
                }),
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }
}
