use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use herald_types::models::BotIdentity;

use crate::delivery::{Deliver, DeliveryError};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram Bot API client. Built once at startup and shared through the
/// dispatcher.
pub struct TelegramBot {
    client: reqwest::Client,
    /// `{api_url}/bot{token}`; never logged since it embeds the token.
    endpoint: String,
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

impl TelegramBot {
    pub fn new(token: &str) -> Result<Self, DeliveryError> {
        Self::with_api_url(DEFAULT_API_URL, token)
    }

    pub fn with_api_url(api_url: &str, token: &str) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, DeliveryError> {
        // Errors carry the request URL, which contains the token.
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        // Refusals come back as 4xx with the same JSON envelope, so the
        // status code alone is not checked.
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            DeliveryError::Malformed(format!("{} ({})", e.without_url(), status))
        })?;

        if !envelope.ok {
            return Err(DeliveryError::Rejected {
                code: envelope.error_code,
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("request failed with {status}")),
            });
        }

        envelope
            .result
            .ok_or_else(|| DeliveryError::Malformed(format!("{method} returned no result")))
    }
}

#[async_trait]
impl Deliver for TelegramBot {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        let _message: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        debug!("Telegram accepted message for chat {}", chat_id);
        Ok(())
    }

    async fn identity(&self) -> Result<Option<BotIdentity>, DeliveryError> {
        let me: BotIdentity = self.call("getMe", json!({})).await?;
        Ok(Some(me))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::post};
    use serde_json::Value;

    /// Serves a fake Bot API on an ephemeral port and returns its base URL.
    async fn fake_api() -> String {
        async fn send_message(Json(body): Json<Value>) -> (axum::http::StatusCode, Json<Value>) {
            if body["chat_id"] == "-404" {
                return (
                    axum::http::StatusCode::BAD_REQUEST,
                    Json(json!({
                        "ok": false,
                        "error_code": 400,
                        "description": "Bad Request: chat not found"
                    })),
                );
            }
            (
                axum::http::StatusCode::OK,
                Json(json!({ "ok": true, "result": { "message_id": 7, "text": body["text"] } })),
            )
        }

        async fn get_me() -> Json<Value> {
            Json(json!({
                "ok": true,
                "result": {
                    "id": 42,
                    "is_bot": true,
                    "first_name": "Herald",
                    "username": "herald_bot",
                    "can_join_groups": true,
                    "can_read_all_group_messages": false
                }
            }))
        }

        let app = Router::new()
            .route("/botTEST/sendMessage", post(send_message))
            .route("/botTEST/getMe", post(get_me));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn delivers_to_known_chat() {
        let bot = TelegramBot::with_api_url(&fake_api().await, "TEST").unwrap();
        bot.deliver("-100", "hello").await.unwrap();
    }

    #[tokio::test]
    async fn surfaces_api_description_on_refusal() {
        let bot = TelegramBot::with_api_url(&fake_api().await, "TEST").unwrap();
        let err = bot.deliver("-404", "hello").await.unwrap_err();

        assert!(matches!(err, DeliveryError::Rejected { code: Some(400), .. }));
        assert_eq!(err.to_string(), "Bad Request: chat not found");
    }

    #[tokio::test]
    async fn wrong_token_is_not_leaked_in_errors() {
        let bot = TelegramBot::with_api_url(&fake_api().await, "SECRET-TOKEN").unwrap();
        let err = bot.deliver("-100", "hello").await.unwrap_err();

        assert!(!err.to_string().contains("SECRET-TOKEN"));
    }

    #[tokio::test]
    async fn reads_bot_identity() {
        let bot = TelegramBot::with_api_url(&fake_api().await, "TEST").unwrap();
        let me = bot.identity().await.unwrap().unwrap();

        assert_eq!(me.id, 42);
        assert_eq!(me.username.as_deref(), Some("herald_bot"));
        assert_eq!(me.can_join_groups, Some(true));
    }
}
