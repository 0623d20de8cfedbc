//! Journal entry storage.

use crate::db::{timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::TextSample;
use rusqlite::{params, Connection};
use tracing::debug;

/// Stores a journal entry and returns its id.
///
/// # Errors
///
/// Returns `AppError::Validation` for blank text.
pub fn insert_journal(conn: &Connection, user: &str, entry: &TextSample) -> AppResult<i64> {
    if entry.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Journal entry cannot be empty".to_string(),
        ));
    }
    debug!("Inserting journal entry of {} characters", entry.text.len());

    conn.execute(
        "INSERT INTO journals (user, content, created_at) VALUES (?1, ?2, ?3)",
        params![user, entry.text, timestamp_to_sql(entry.created_at)],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(conn.last_insert_rowid())
}

/// Most recent journal entries, newest first.
pub fn recent_journals(conn: &Connection, user: &str, limit: usize) -> AppResult<Vec<TextSample>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT content, created_at
            FROM journals
            WHERE user = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let journals = stmt
        .query_map(params![user, limit as i64], |row| {
            Ok(TextSample {
                text: row.get(0)?,
                created_at: timestamp_from_sql(1, &row.get::<_, String>(1)?)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(journals)
}
