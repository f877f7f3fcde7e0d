//! SQLite storage.
//!
//! One connection behind a mutex. Every query is short, so handlers lock,
//! run their statements and release without ever holding the lock across an
//! `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::ApiError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS incident_reports (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    reporter_name    TEXT NOT NULL,
    reporter_contact TEXT,
    type             TEXT NOT NULL,
    description      TEXT NOT NULL,
    latitude         REAL,
    longitude        REAL,
    address          TEXT,
    image_urls       TEXT NOT NULL DEFAULT '[]',
    status           TEXT NOT NULL DEFAULT 'Pending',
    barangay_id      TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evac_centers (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL,
    address           TEXT,
    barangay_id       TEXT,
    lat               REAL,
    lng               REAL,
    capacity          INTEGER NOT NULL DEFAULT 0,
    current_occupancy INTEGER NOT NULL DEFAULT 0,
    services          TEXT NOT NULL DEFAULT '[]',
    status            TEXT NOT NULL DEFAULT 'Open',
    contact_number    TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS alerts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    message       TEXT NOT NULL,
    level         TEXT NOT NULL DEFAULT 'Low',
    area_affected TEXT,
    status        TEXT NOT NULL DEFAULT 'Active',
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    organization TEXT,
    phone_number TEXT NOT NULL,
    type         TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS news (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    description   TEXT,
    video_url     TEXT NOT NULL,
    thumbnail_url TEXT,
    category      TEXT NOT NULL DEFAULT '[]',
    published_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT UNIQUE,
    password    TEXT NOT NULL,
    role        TEXT NOT NULL DEFAULT 'guest',
    barangay_id TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL,
    sender          TEXT NOT NULL,
    body            TEXT NOT NULL,
    recipient_role  TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS logs (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    level      TEXT NOT NULL DEFAULT 'info',
    message    TEXT NOT NULL,
    user_name  TEXT,
    action     TEXT,
    details    TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS affected_people (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    sex         TEXT,
    age         INTEGER,
    purok       TEXT,
    birthday    TEXT,
    affected    INTEGER NOT NULL DEFAULT 1,
    evacuated   INTEGER NOT NULL DEFAULT 0,
    barangay_id TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
"#;

#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Opens (creating if needed) the database at `path`.
    /// `:memory:` gives a private in-memory database.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;
        log::info!("Database ready at {path}");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        Self::open(":memory:")
    }

    pub fn with<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn)
    }

    pub fn ping(&self) -> bool {
        self.with(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .inspect_err(|e| log::error!("Database health check failed: {e}"))
            .is_ok()
    }
}

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Treats blank strings as absent, the way form submissions send "nothing".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sagip.db");
        let path = path.to_str().unwrap();

        Db::open(path).unwrap();
        let db = Db::open(path).unwrap();
        assert!(db.ping());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
