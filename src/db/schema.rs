//! Database schema definitions and initialization.
//!
//! This module defines the SQLite schema for mood ratings, journal entries,
//! chat turns, suggestions and wellness goals. Every user-owned row carries
//! the user name; timestamps are RFC 3339 text so they sort lexically.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
///
/// Increment this whenever schema changes are made to support future migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// This function is idempotent - it uses `CREATE TABLE IF NOT EXISTS`
/// so it's safe to call multiple times.
///
/// # Tables
///
/// - `moods`: Mood ratings with optional notes
/// - `journals`: Free-text journal entries
/// - `chat_messages`: User and assistant chat turns
/// - `suggestions`: Generated self-care suggestions and their lifecycle flags
/// - `goals`: Wellness goals with streak state
/// - `goal_progress`: One progress report per goal per day
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    debug!("Creating database tables");

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS moods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            mood TEXT NOT NULL CHECK(mood IN ('very_sad', 'sad', 'neutral', 'happy', 'very_happy')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_moods_user_created ON moods(user, created_at DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS journals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_journals_user_created ON journals(user, created_at DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            message TEXT NOT NULL,
            is_user INTEGER NOT NULL,
            is_error INTEGER NOT NULL DEFAULT 0,
            response_time REAL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_user_created ON chat_messages(user, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_chat_is_user ON chat_messages(is_user);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS suggestions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            category TEXT NOT NULL,
            suggestion TEXT NOT NULL,
            duration TEXT NOT NULL DEFAULT '',
            sentiment TEXT NOT NULL CHECK(sentiment IN ('negative', 'neutral', 'positive')),
            is_completed INTEGER NOT NULL DEFAULT 0,
            is_saved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_suggestions_user_open
            ON suggestions(user, is_completed, created_at DESC);
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            custom_goal TEXT,
            target TEXT NOT NULL,
            frequency TEXT NOT NULL DEFAULT 'daily',
            start_date TEXT NOT NULL,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_check_in TEXT,
            streak_count INTEGER NOT NULL DEFAULT 0,
            notes TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user, is_active);

        CREATE TABLE IF NOT EXISTS goal_progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            progress TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            FOREIGN KEY (goal_id) REFERENCES goals(id) ON DELETE CASCADE,
            UNIQUE(goal_id, date)
        );
        "#,
    )
    .map_err(DatabaseError::Sqlite)?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(DatabaseError::Sqlite)?;

    info!("Database tables created successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        for table in [
            "moods",
            "journals",
            "chat_messages",
            "suggestions",
            "goals",
            "goal_progress",
        ] {
            assert!(table_exists(&conn, table), "missing table {}", table);
        }

        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_create_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_mood_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO moods (user, mood, created_at) VALUES ('a', 'ecstatic', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
