pub mod account_repo;
pub mod admin_repo;
pub mod migrations;

use crate::domain::error::DomainError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;

/// Opens `db_path` in WAL mode with the schema applied.
pub fn open(db_path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
pub(crate) fn to_sql_time(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn from_sql_time(idx: usize, s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn from_sql_json<T: serde::de::DeserializeOwned>(idx: usize, s: &str) -> Result<T, rusqlite::Error> {
    serde_json::from_str(s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
