//! Database row types. These map directly to SQLite rows,
//! distinct from the herald-types API models.

use herald_types::models::HistoryStatus;

pub struct UserRow {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: String,
}

pub struct GroupRow {
    pub id: i64,
    pub chat_id: String,
    pub name: String,
    pub user_id: i64,
    pub active: bool,
    pub created_at: String,
}

pub struct TemplateRow {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub user_id: i64,
    pub created_at: String,
}

pub struct HistoryRow {
    pub id: i64,
    pub message_text: String,
    pub groups_sent: String,
    pub user_id: i64,
    pub sent_at: String,
    pub status: String,
}

/// A history record about to be written.
pub struct NewHistory<'a> {
    pub user_id: i64,
    pub message_text: &'a str,
    pub groups_sent: &'a str,
    pub status: HistoryStatus,
}
