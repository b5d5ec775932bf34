use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{Result, WorkflowError};

/// Messaging side channel: a destination identifier plus a text body
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &str;

    async fn send(&self, destination_id: &str, body: &str) -> Result<()>;
}

/// Bot credentials and chat for one destination
#[derive(Debug, Clone)]
pub struct TelegramDestination {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Telegram Bot API transport, Markdown parse mode
pub struct TelegramChannel {
    api_base: String,
    destinations: HashMap<String, TelegramDestination>,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            destinations: HashMap::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_destination(
        mut self,
        destination_id: impl Into<String>,
        destination: TelegramDestination,
    ) -> Self {
        self.destinations.insert(destination_id.into(), destination);
        self
    }
}

#[async_trait]
impl MessageChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, destination_id: &str, body: &str) -> Result<()> {
        let destination = self.destinations.get(destination_id).ok_or_else(|| {
            WorkflowError::NotificationError(format!("unknown destination '{destination_id}'"))
        })?;

        let url = format!("{}/bot{}/sendMessage", self.api_base, destination.bot_token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id: &destination.chat_id,
                text: body,
                parse_mode: "Markdown",
            })
            .send()
            .await
            .map_err(|e| WorkflowError::NotificationError(format!("Telegram send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::NotificationError(format!(
                "Telegram returned {status}: {body}"
            )));
        }

        debug!(destination_id, "Telegram message delivered");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogChannel;

#[async_trait]
impl MessageChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, destination_id: &str, body: &str) -> Result<()> {
        info!(destination_id, body, "Notification (log channel)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn channel(server: &MockServer) -> TelegramChannel {
        TelegramChannel::new(server.uri()).with_destination(
            "telegram_conn_id",
            TelegramDestination {
                bot_token: "123:abc".to_string(),
                chat_id: "-100200".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_posts_markdown_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": "-100200",
                "text": "hello",
                "parse_mode": "Markdown"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        channel(&server)
            .send("telegram_conn_id", "hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("can't parse entities"))
            .mount(&server)
            .await;

        let err = channel(&server)
            .send("telegram_conn_id", "bad_markdown")
            .await
            .unwrap_err();
        match err {
            WorkflowError::NotificationError(msg) => assert!(msg.contains("400")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_destination() {
        let channel = TelegramChannel::new("http://127.0.0.1:1");
        assert!(matches!(
            channel.send("nope", "x").await,
            Err(WorkflowError::NotificationError(_))
        ));
    }

    #[tokio::test]
    async fn test_log_channel_accepts_everything() {
        assert!(LogChannel.send("anything", "body").await.is_ok());
    }
}
