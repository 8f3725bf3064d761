use rusqlite::{Connection, params};
use tracing::info;

use crate::Result;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Applied in order; each step runs once and is recorded in `schema_version`.
/// Never edit a shipped step, append a new one.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users",
        sql: "
            CREATE TABLE IF NOT EXISTS users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                is_admin        INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );
        ",
    },
    Migration {
        version: 2,
        name: "tenant resources",
        sql: "
            CREATE TABLE IF NOT EXISTS chat_groups (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id     TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL,
                user_id     INTEGER NOT NULL,
                active      INTEGER NOT NULL DEFAULT 1,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS templates (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                content     TEXT NOT NULL,
                user_id     INTEGER NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS message_history (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                message_text    TEXT NOT NULL,
                groups_sent     TEXT NOT NULL,
                user_id         INTEGER NOT NULL,
                sent_at         TEXT NOT NULL DEFAULT (datetime('now')),
                status          TEXT NOT NULL DEFAULT 'sent'
            );
        ",
    },
    Migration {
        version: 3,
        name: "owner indexes",
        sql: "
            CREATE INDEX IF NOT EXISTS idx_groups_user_id ON chat_groups(user_id);
            CREATE INDEX IF NOT EXISTS idx_templates_user_id ON templates(user_id);
            CREATE INDEX IF NOT EXISTS idx_history_user_id ON message_history(user_id);
            CREATE INDEX IF NOT EXISTS idx_history_user_date ON message_history(user_id, sent_at);
        ",
    },
];

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current = current_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            "Database: running migration v{} ({})",
            migration.version, migration.name
        );
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", latest_version());
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}
