//! SQLite storage for moods, journals, chats, suggestions and goals.
//!
//! This module provides SQLite database operations with connection pooling
//! via r2d2. [`Database`] implements [`WellnessStore`], the interface the
//! suggestion engine reads from.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `moods`, `journals`, `chats`: Signal storage
//! - `suggestions`: Suggestion records and their lifecycle
//! - `goals`: Wellness goals and progress
//!
//! # Example
//!
//! ```no_run
//! use solace::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/solace.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chats;
pub mod goals;
pub mod journals;
pub mod moods;
pub mod schema;
pub mod suggestions;

use crate::errors::{AppResult, DatabaseError};
use crate::models::{ChatMessage, MoodSample, SuggestionRecord, TextSample};
use crate::store::WellnessStore;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database handle with connection pooling.
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates the SQLite database, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Database file cannot be opened
    /// - Connection pool cannot be initialized
    pub fn open(db_path: &Path) -> AppResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(5) // Allow up to 5 concurrent connections
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(DatabaseError::Pool)?;

        // Test the connection
        let conn = pool.get().map_err(DatabaseError::Pool)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(DatabaseError::Sqlite)?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> AppResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::Pool(e).into())
    }

    /// Initializes the database schema.
    ///
    /// Creates all necessary tables and indexes if they don't exist.
    /// This is idempotent and safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    pub fn initialize_schema(&self) -> AppResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

impl WellnessStore for Database {
    fn recent_moods(&self, user: &str, limit: usize) -> AppResult<Vec<MoodSample>> {
        moods::recent_moods(&*self.get_conn()?, user, limit)
    }

    fn recent_journals(&self, user: &str, limit: usize) -> AppResult<Vec<TextSample>> {
        journals::recent_journals(&*self.get_conn()?, user, limit)
    }

    fn recent_chats(
        &self,
        user: &str,
        limit: usize,
        assistant_only: bool,
    ) -> AppResult<Vec<ChatMessage>> {
        chats::recent_chats(&*self.get_conn()?, user, limit, assistant_only)
    }

    fn append_suggestion(&self, user: &str, record: &SuggestionRecord) -> AppResult<i64> {
        suggestions::insert_suggestion(&*self.get_conn()?, user, record, Utc::now())
    }
}

/// Connection customizer applied to every pooled connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}

/// Formats a timestamp for storage.
///
/// A fixed precision and the `Z` suffix keep stored values lexically ordered.
pub(crate) fn timestamp_to_sql(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp, reporting failures against column `idx`.
pub(crate) fn timestamp_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Maps a row-level parse failure of an enum column.
pub(crate) fn text_conversion_error(idx: usize, err: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            err.to_string(),
        )),
    )
}
