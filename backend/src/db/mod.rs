//! SQLite persistence behind a shared connection.

mod admins;
mod applications;
mod contacts;
mod content;
mod documents;
mod events;
mod gallery;
mod notifications;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Database lock poisoned")]
    Poisoned,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document store for every resource the API serves.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database and make sure the schema exists.
    pub fn open(database_url: &str) -> Result<Self, DbError> {
        let path = database_url
            .strip_prefix("sqlite:")
            .unwrap_or(database_url);

        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let conn = Connection::open(path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS admins (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'admin',
                super_admin INTEGER NOT NULL DEFAULT 0,
                avatar TEXT,
                last_active_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS applications (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                course TEXT NOT NULL,
                message TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                reviewed_by TEXT,
                reviewed_at TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS contact_messages (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                responded INTEGER NOT NULL DEFAULT 0,
                responded_by TEXT,
                response_message TEXT,
                responded_at TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                category TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT,
                location TEXT,
                description TEXT,
                featured INTEGER NOT NULL DEFAULT 0,
                image_url TEXT,
                attendees TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                uploaded_by TEXT NOT NULL,
                uploaded_by_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS gallery_images (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                uploaded_by TEXT NOT NULL,
                uploaded_by_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS content_blocks (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                updated_by TEXT NOT NULL,
                updated_by_id TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                kind TEXT NOT NULL,
                priority TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                expires_at TEXT,
                created_by TEXT NOT NULL,
                created_by_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_applications_created_at
             ON applications(created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_start_at ON events(start_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_gallery_images_category
             ON gallery_images(category, created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_gallery_images_uploader
             ON gallery_images(uploaded_by_id, created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notifications_created_at
             ON notifications(created_at)",
            [],
        )?;

        tracing::info!("Database initialized: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }
}

/// Parse a stored RFC 3339 timestamp. Rows are only ever written with
/// `to_rfc3339`, so a parse failure means outside tampering; fall back
/// to now rather than failing the whole read.
pub(crate) fn parse_ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn parse_ts_opt(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_with_prefix() {
        assert!(Database::open("sqlite::memory:").is_ok());
        assert!(Database::open(":memory:").is_ok());
    }

    #[test]
    fn creates_parent_directory_for_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/club.db");
        let url = format!("sqlite:{}", path.display());
        assert!(Database::open(&url).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn parse_ts_round_trips() {
        let now = Utc::now();
        let parsed = parse_ts(&now.to_rfc3339());
        assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
        assert_eq!(parse_ts_opt(None), None);
        assert!(parse_ts_opt(Some(now.to_rfc3339())).is_some());
    }
}
