use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TELEGRAM_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The URL embeds the bot token, so it is stripped before wrapping.
    #[error("telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("telegram refused {method}: {description}")]
    Refused { method: &'static str, description: String },
}

impl BotError {
    fn http(e: reqwest::Error) -> Self {
        BotError::Http(e.without_url())
    }
}

/// Every Bot API answer is wrapped in `{ok, result | description}`.
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Minimal Bot API client: long-poll updates and send text.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base: TELEGRAM_BASE.to_owned(),
            token: token.into(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Long-poll for updates at or after `offset`. The HTTP timeout is a
    /// little longer than the server-side poll timeout.
    pub async fn get_updates(&self, offset: i64, poll_secs: u64) -> Result<Vec<Update>, BotError> {
        let body = GetUpdates {
            offset,
            timeout: poll_secs,
            allowed_updates: ["message"],
        };
        let http_timeout = Duration::from_secs(poll_secs + 10);
        let updates: Vec<Update> = self.call("getUpdates", &body, http_timeout).await?;
        if !updates.is_empty() {
            debug!("received {} telegram updates", updates.len());
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let body = SendMessage { chat_id, text };
        let _: serde_json::Value = self.call("sendMessage", &body, Duration::from_secs(15)).await?;
        Ok(())
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, BotError> {
        let url = format!("{}/bot{}/{method}", self.base, self.token);
        let response: TelegramResponse<T> = self
            .client
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(BotError::http)?
            .json()
            .await
            .map_err(BotError::http)?;

        match response {
            TelegramResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            TelegramResponse { description, .. } => Err(BotError::Refused {
                method,
                description: description.unwrap_or_else(|| "no description".to_owned()),
            }),
        }
    }
}

/// Operator alerts for the collector. Sending is best-effort.
#[derive(Debug, Clone)]
pub struct Alerter {
    client: TelegramClient,
    chat_id: String,
}

impl Alerter {
    pub fn new(client: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            chat_id: chat_id.into(),
        }
    }

    pub async fn alert(&self, message: &str) {
        let text = format!("⚠️ Goal2Gol collector error:\n{message}");
        if let Err(e) = self.client.send_message(&self.chat_id, &text).await {
            warn!("could not deliver alert: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn get_updates_posts_the_offset() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/getUpdates")
            .match_body(Matcher::PartialJson(json!({"offset": 42, "timeout": 30})))
            .with_status(200)
            .with_body(
                json!({"ok": true, "result": [
                    {"update_id": 42, "message": {"chat": {"id": 7}, "text": "/live"}},
                    {"update_id": 43}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let client = TelegramClient::new("TOKEN").with_base(server.url());
        let updates = client.get_updates(42, 30).await.unwrap();

        mock.assert_async().await;
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 7);
        assert_eq!(message.text.as_deref(), Some("/live"));
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn refusals_carry_the_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botBAD/sendMessage")
            .with_status(401)
            .with_body(r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#)
            .create_async()
            .await;

        let client = TelegramClient::new("BAD").with_base(server.url());
        let err = client.send_message("1", "hi").await.unwrap_err();
        assert!(matches!(err, BotError::Refused { method: "sendMessage", .. }));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botSECRET123/getUpdates")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let client = TelegramClient::new("SECRET123").with_base(server.url());
        let err = client.get_updates(0, 1).await.unwrap_err();
        assert!(matches!(err, BotError::Http(_)));
        assert!(!err.to_string().contains("SECRET123"), "{err}");
        assert!(!format!("{err:?}").contains("SECRET123"), "{err:?}");
    }

    #[tokio::test]
    async fn alerts_are_prefixed_and_failures_swallowed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botT/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": "-100",
                "text": "⚠️ Goal2Gol collector error:\ndisk full"
            })))
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let alerter = Alerter::new(TelegramClient::new("T").with_base(server.url()), "-100");
        alerter.alert("disk full").await;
        mock.assert_async().await;
    }
}
