use async_trait::async_trait;
use thiserror::Error;

use herald_types::models::BotIdentity;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The request never got a usable HTTP response.
    #[error("{0}")]
    Transport(reqwest::Error),

    /// The messaging service answered and refused the message.
    #[error("{description}")]
    Rejected {
        code: Option<i64>,
        description: String,
    },

    #[error("unexpected response: {0}")]
    Malformed(String),
}

/// Sends one text message to one external chat.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError>;

    /// Account the messages are sent from, if the backend can tell.
    async fn identity(&self) -> Result<Option<BotIdentity>, DeliveryError> {
        Ok(None)
    }
}
