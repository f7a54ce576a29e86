//! Telegram Bot API sink (`sendPhoto`).

use super::{ImageSink, OutboundPhoto, RelayError, PHOTO_CONTENT_TYPE, PHOTO_FILENAME};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT_SECS: u64 = 30;

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramSink {
    client: reqwest::Client,
    send_photo_url: String,
}

impl TelegramSink {
    pub fn new(bot_token: &str) -> Result<Self, anyhow::Error> {
        Self::with_base_url(bot_token, TELEGRAM_API_BASE)
    }

    fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build relay client: {}", e))?;

        Ok(Self {
            client,
            send_photo_url: format!("{}/bot{}/sendPhoto", base_url, bot_token),
        })
    }
}

#[async_trait]
impl ImageSink for TelegramSink {
    async fn deliver(&self, photo: &OutboundPhoto, recipient: &str) -> Result<(), RelayError> {
        let part = Part::bytes(photo.bytes.to_vec())
            .file_name(PHOTO_FILENAME)
            .mime_str(PHOTO_CONTENT_TYPE)
            .map_err(|e| RelayError::Rejected(format!("invalid photo part: {}", e)))?;

        let mut form = Form::new()
            .text("chat_id", recipient.to_string())
            .part("photo", part);
        if let Some(caption) = &photo.caption {
            form = form.text("caption", caption.clone());
        }

        let response = self
            .client
            .post(&self.send_photo_url)
            .multipart(form)
            .send()
            .await
            .map_err(RelayError::Unreachable)?;

        let status = response.status();
        let body: BotApiResponse = response.json().await.map_err(|e| {
            RelayError::Rejected(format!("unreadable response (status {}): {}", status, e))
        })?;

        if !body.ok {
            return Err(RelayError::Rejected(
                body.description
                    .unwrap_or_else(|| format!("status {}", status)),
            ));
        }

        tracing::info!(
            recipient = %recipient,
            bytes = photo.bytes.len(),
            "Photo delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_photo_url_shape() {
        let sink = TelegramSink::with_base_url("12345:token", "https://api.example").unwrap();
        assert_eq!(
            sink.send_photo_url,
            "https://api.example/bot12345:token/sendPhoto"
        );
    }

    #[test]
    fn test_bot_api_response_parses_failure_description() {
        let body: BotApiResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"chat not found"}"#)
                .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("chat not found"));
    }

    #[test]
    fn test_bot_api_response_parses_success_without_description() {
        let body: BotApiResponse =
            serde_json::from_str(r#"{"ok":true,"result":{"message_id":7}}"#).unwrap();
        assert!(body.ok);
        assert!(body.description.is_none());
    }
}
