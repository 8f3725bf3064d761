use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use herald_types::models::BotIdentity;

use crate::delivery::{Deliver, DeliveryError};

/// In-memory sender that records every call and refuses chosen chat ids.
#[derive(Default)]
pub struct ScriptedSender {
    refused: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
    identity: Option<BotIdentity>,
    identity_error: Option<String>,
}

impl ScriptedSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries to `chat_id` fail with "Forbidden: bot was kicked".
    pub fn refusing(mut self, chat_id: &str) -> Self {
        self.refused.insert(chat_id.to_string());
        self
    }

    /// `identity()` answers with `bot`.
    pub fn with_identity(mut self, bot: BotIdentity) -> Self {
        self.identity = Some(bot);
        self
    }

    /// `identity()` fails as if the service sent back garbage.
    pub fn failing_identity(mut self, detail: &str) -> Self {
        self.identity_error = Some(detail.to_string());
        self
    }

    /// `(chat_id, text)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Deliver for ScriptedSender {
    async fn deliver(&self, chat_id: &str, text: &str) -> Result<(), DeliveryError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((chat_id.to_string(), text.to_string()));
        }
        if self.refused.contains(chat_id) {
            return Err(DeliveryError::Rejected {
                code: Some(403),
                description: "Forbidden: bot was kicked".to_string(),
            });
        }
        Ok(())
    }

    async fn identity(&self) -> Result<Option<BotIdentity>, DeliveryError> {
        match &self.identity_error {
            Some(detail) => Err(DeliveryError::Malformed(detail.clone())),
            None => Ok(self.identity.clone()),
        }
    }
}
