//! Row-to-wire conversions.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use herald_db::models::{GroupRow, HistoryRow, TemplateRow, UserRow};
use herald_types::models::{Group, HistoryEntry, HistoryStatus, Template, UserProfile, UserSummary};

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" in UTC without an
/// offset; RFC 3339 is accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}

fn timestamp_or_default(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt timestamp '{}' on {} {}", raw, what, id);
        DateTime::default()
    })
}

pub fn user_summary(row: &UserRow) -> UserSummary {
    UserSummary {
        id: row.id,
        name: row.name.clone(),
        email: row.email.clone(),
        is_admin: row.is_admin,
    }
}

pub fn user_profile(row: UserRow) -> UserProfile {
    UserProfile {
        created_at: timestamp_or_default(&row.created_at, "user", row.id),
        id: row.id,
        name: row.name,
        email: row.email,
        is_admin: row.is_admin,
    }
}

pub fn group(row: GroupRow) -> Group {
    Group {
        created_at: timestamp_or_default(&row.created_at, "group", row.id),
        id: row.id,
        chat_id: row.chat_id,
        name: row.name,
        active: row.active,
    }
}

pub fn template(row: TemplateRow) -> Template {
    Template {
        created_at: timestamp_or_default(&row.created_at, "template", row.id),
        id: row.id,
        name: row.name,
        content: row.content,
    }
}

pub fn history_entry(row: HistoryRow) -> HistoryEntry {
    let status = row.status.parse().unwrap_or_else(|e| {
        warn!("{} on history record {}", e, row.id);
        HistoryStatus::Failed
    });

    HistoryEntry {
        sent_at: timestamp_or_default(&row.sent_at, "history record", row.id),
        id: row.id,
        message_text: row.message_text,
        groups_sent: row.groups_sent,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_sqlite_and_rfc3339_timestamps() {
        let sqlite = parse_timestamp("2024-03-05 14:30:09").unwrap();
        assert_eq!((sqlite.year(), sqlite.month(), sqlite.day()), (2024, 3, 5));
        assert_eq!((sqlite.hour(), sqlite.minute(), sqlite.second()), (14, 30, 9));

        let rfc = parse_timestamp("2024-03-05T14:30:09Z").unwrap();
        assert_eq!(rfc, sqlite);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn unknown_history_status_reads_as_failed() {
        let entry = history_entry(HistoryRow {
            id: 1,
            message_text: "m".into(),
            groups_sent: String::new(),
            user_id: 1,
            sent_at: "2024-03-05 14:30:09".into(),
            status: "queued".into(),
        });
        assert_eq!(entry.status, HistoryStatus::Failed);
    }
}
