use crate::models::{GroupRow, HistoryRow, NewHistory, TemplateRow, UserRow};
use crate::{Database, DbError, Result};
use herald_types::models::Stats;
use rusqlite::{Connection, Row, params};

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at";
const GROUP_COLUMNS: &str = "id, chat_id, name, user_id, active, created_at";
const TEMPLATE_COLUMNS: &str = "id, name, content, user_id, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        name: Option<&str>,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (name, email, password_hash, is_admin) VALUES (?1, ?2, ?3, ?4)",
                params![name, email, password_hash, is_admin],
            )
            .map_err(|e| DbError::on_unique(e, "email"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .optional()
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"),
                [],
                user_from_row,
            )
        })
    }

    /// Deletes a regular account. Returns false when the id is unknown or
    /// belongs to an admin; admins are never removed through this path.
    pub fn delete_non_admin_user(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE id = ?1 AND is_admin = 0", [id])?;
            Ok(deleted > 0)
        })
    }

    /// Updates whichever of name and password hash are given.
    pub fn update_user_profile(
        &self,
        id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users
                 SET name = COALESCE(?1, name),
                     password_hash = COALESCE(?2, password_hash)
                 WHERE id = ?3",
                params![name, password_hash, id],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Groups --

    pub fn list_groups(&self, user_id: i64) -> Result<Vec<GroupRow>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {GROUP_COLUMNS} FROM chat_groups WHERE user_id = ?1 ORDER BY name"
                ),
                [user_id],
                group_from_row,
            )
        })
    }

    /// `chat_id` is unique across all tenants, not per tenant.
    pub fn create_group(&self, user_id: i64, chat_id: &str, name: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_groups (chat_id, name, user_id) VALUES (?1, ?2, ?3)",
                params![chat_id, name, user_id],
            )
            .map_err(|e| DbError::on_unique(e, "chat_id"))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Resolves ids in the given order, dropping any that are unknown or owned
    /// by another tenant.
    pub fn resolve_groups(&self, user_id: i64, ids: &[i64]) -> Result<Vec<GroupRow>> {
        self.with_conn(|conn| {
            let mut groups = Vec::with_capacity(ids.len());
            for &id in ids {
                if let Some(group) = query_group(conn, user_id, id)? {
                    groups.push(group);
                }
            }
            Ok(groups)
        })
    }

    pub fn set_group_active(&self, user_id: i64, id: i64, active: bool) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE chat_groups SET active = ?1 WHERE id = ?2 AND user_id = ?3",
                params![active, id, user_id],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Templates --

    pub fn list_templates(&self, user_id: i64) -> Result<Vec<TemplateRow>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                &format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE user_id = ?1 ORDER BY name"
                ),
                [user_id],
                template_from_row,
            )
        })
    }

    pub fn create_template(&self, user_id: i64, name: &str, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO templates (name, content, user_id) VALUES (?1, ?2, ?3)",
                params![name, content, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_template(&self, user_id: i64, id: i64) -> Result<Option<TemplateRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                template_from_row,
            )
            .optional()
        })
    }

    pub fn update_template(
        &self,
        user_id: i64,
        id: i64,
        name: &str,
        content: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE templates SET name = ?1, content = ?2 WHERE id = ?3 AND user_id = ?4",
                params![name, content, id, user_id],
            )?;
            Ok(updated > 0)
        })
    }

    /// Returns false both for unknown ids and for another tenant's template.
    pub fn delete_template(&self, user_id: i64, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM templates WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    // -- History --

    pub fn insert_history(&self, record: &NewHistory<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message_history (message_text, groups_sent, status, user_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.message_text,
                    record.groups_sent,
                    record.status.as_str(),
                    record.user_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Newest first. `sent_at` has second resolution, so ties fall back to id.
    pub fn list_history(&self, user_id: i64, limit: u32) -> Result<Vec<HistoryRow>> {
        self.with_conn(|conn| {
            query_all(
                conn,
                "SELECT id, message_text, groups_sent, user_id, sent_at, status
                 FROM message_history
                 WHERE user_id = ?1
                 ORDER BY sent_at DESC, id DESC
                 LIMIT ?2",
                params![user_id, limit],
                |row| {
                    Ok(HistoryRow {
                        id: row.get(0)?,
                        message_text: row.get(1)?,
                        groups_sent: row.get(2)?,
                        user_id: row.get(3)?,
                        sent_at: row.get(4)?,
                        status: row.get(5)?,
                    })
                },
            )
        })
    }

    // -- Stats --

    /// Day boundaries follow the server's local time zone. `sent_at` is
    /// stored in UTC and converted before comparing dates.
    pub fn stats_for(&self, user_id: i64) -> Result<Stats> {
        self.with_conn(|conn| {
            let stats = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM chat_groups WHERE user_id = ?1 AND active = 1),
                    (SELECT COUNT(*) FROM templates WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM message_history
                        WHERE user_id = ?1 AND status = 'sent'
                          AND DATE(sent_at, 'localtime') = DATE('now', 'localtime')),
                    (SELECT COUNT(*) FROM message_history
                        WHERE user_id = ?1 AND status = 'sent'
                          AND DATE(sent_at, 'localtime') >= DATE('now', 'localtime', '-7 days')),
                    (SELECT COUNT(*) FROM message_history
                        WHERE user_id = ?1 AND status = 'sent')",
                [user_id],
                |row| {
                    Ok(Stats {
                        active_groups: row.get(0)?,
                        total_templates: row.get(1)?,
                        messages_today: row.get(2)?,
                        messages_week: row.get(3)?,
                        total_messages: row.get(4)?,
                    })
                },
            )?;
            Ok(stats)
        })
    }
}

fn query_group(conn: &Connection, user_id: i64, id: i64) -> Result<Option<GroupRow>> {
    conn.query_row(
        &format!("SELECT {GROUP_COLUMNS} FROM chat_groups WHERE id = ?1 AND user_id = ?2"),
        [id, user_id],
        group_from_row,
    )
    .optional()
}

fn query_all<P, F, T>(conn: &Connection, sql: &str, params: P, map: F) -> Result<Vec<T>>
where
    P: rusqlite::Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        is_admin: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<GroupRow> {
    Ok(GroupRow {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        name: row.get(2)?,
        user_id: row.get(3)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
