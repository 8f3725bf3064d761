use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE constraint rejected the write. Carries the offending column.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("DB lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// Maps a UNIQUE violation to `Duplicate(column)`, anything else to `Sqlite`.
    pub(crate) fn on_unique(err: rusqlite::Error, column: &'static str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::Duplicate(column)
            }
            _ => Self::Sqlite(err),
        }
    }
}
