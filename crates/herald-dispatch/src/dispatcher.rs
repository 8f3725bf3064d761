use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use herald_db::models::NewHistory;
use herald_db::{Database, DbError};
use herald_types::api::SendMessageResponse;
use herald_types::models::HistoryStatus;

use crate::delivery::Deliver;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Message is required")]
    EmptyMessage,

    #[error("Select at least one group")]
    NoGroups,

    #[error("Bot not configured")]
    NotConfigured,

    #[error(transparent)]
    Store(#[from] DbError),

    #[error("dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of one broadcast, after its history record was written.
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    pub history_id: i64,
    pub status: HistoryStatus,
    pub sent_groups: Vec<String>,
    /// `"{group name}: {error}"` per failed delivery.
    pub failed_groups: Vec<String>,
}

impl BroadcastReport {
    pub fn summary(self) -> SendMessageResponse {
        SendMessageResponse {
            total_sent: self.sent_groups.len(),
            total_failed: self.failed_groups.len(),
            sent_groups: self.sent_groups,
            failed_groups: self.failed_groups,
        }
    }
}

/// Fans a message out to a tenant's groups and records the outcome.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    db: Arc<Database>,

    /// `None` when no bot token is configured; broadcasts then fail fast.
    sender: Option<Arc<dyn Deliver>>,

    /// Pause between consecutive deliveries of one broadcast
    send_delay: Duration,
}

impl Dispatcher {
    pub fn new(db: Arc<Database>, sender: Option<Arc<dyn Deliver>>, send_delay: Duration) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                db,
                sender,
                send_delay,
            }),
        }
    }

    pub fn sender(&self) -> Option<&Arc<dyn Deliver>> {
        self.inner.sender.as_ref()
    }

    /// Sends `message` to each of `group_ids` owned by `user_id`, in order.
    ///
    /// Ids that do not resolve to one of the caller's groups are skipped. A
    /// failed delivery is recorded and the batch continues. Exactly one
    /// history record is written per call that passes validation.
    ///
    /// The fan-out runs on its own task, so dropping the returned future
    /// (a client disconnect) does not cut the broadcast short.
    pub async fn broadcast(
        &self,
        user_id: i64,
        message: &str,
        group_ids: &[i64],
    ) -> Result<BroadcastReport, DispatchError> {
        if message.is_empty() {
            return Err(DispatchError::EmptyMessage);
        }
        if group_ids.is_empty() {
            return Err(DispatchError::NoGroups);
        }
        let sender = self.inner.sender.clone().ok_or(DispatchError::NotConfigured)?;

        let inner = self.inner.clone();
        let task = inner.fan_out(sender, user_id, message.to_string(), group_ids.to_vec());
        tokio::spawn(task).await?
    }
}

impl DispatcherInner {
    async fn fan_out(
        self: Arc<Self>,
        sender: Arc<dyn Deliver>,
        user_id: i64,
        message: String,
        group_ids: Vec<i64>,
    ) -> Result<BroadcastReport, DispatchError> {
        let db = self.db.clone();
        let requested = group_ids.len();
        let groups =
            tokio::task::spawn_blocking(move || db.resolve_groups(user_id, &group_ids)).await??;

        if groups.len() < requested {
            debug!(
                "Broadcast by user {}: skipping {} group id(s) not owned by the caller",
                user_id,
                requested - groups.len()
            );
        }

        let mut sent_groups = Vec::new();
        let mut failed_groups = Vec::new();

        for (i, group) in groups.iter().enumerate() {
            if i > 0 && !self.send_delay.is_zero() {
                tokio::time::sleep(self.send_delay).await;
            }

            match sender.deliver(&group.chat_id, &message).await {
                Ok(()) => {
                    info!("Message sent to {} ({})", group.name, group.chat_id);
                    sent_groups.push(group.name.clone());
                }
                Err(e) => {
                    error!("Failed to send to {} ({}): {}", group.name, group.chat_id, e);
                    failed_groups.push(format!("{}: {}", group.name, e));
                }
            }
        }

        let status = if sent_groups.is_empty() {
            HistoryStatus::Failed
        } else {
            HistoryStatus::Sent
        };

        let db = self.db.clone();
        let joined = sent_groups.join(", ");
        let history_id = tokio::task::spawn_blocking(move || {
            db.insert_history(&NewHistory {
                user_id,
                message_text: &message,
                groups_sent: &joined,
                status,
            })
        })
        .await??;

        info!(
            "Broadcast {} by user {} recorded as {}: {} sent, {} failed",
            history_id,
            user_id,
            status,
            sent_groups.len(),
            failed_groups.len()
        );

        Ok(BroadcastReport {
            history_id,
            status,
            sent_groups,
            failed_groups,
        })
    }
}
