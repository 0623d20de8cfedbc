//! Suggestion records and their lifecycle.
//!
//! A suggestion is open until it is completed, either directly or when a
//! refresh replaces it. Saving marks a suggestion as a favourite and does not
//! close it.

use crate::db::{text_conversion_error, timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Category, SentimentLabel, StoredSuggestion, SuggestionRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

fn suggestion_from_row(row: &Row<'_>) -> rusqlite::Result<StoredSuggestion> {
    let category: String = row.get(1)?;
    let sentiment: String = row.get(4)?;
    Ok(StoredSuggestion {
        id: row.get(0)?,
        record: SuggestionRecord {
            category: Category::from_token(&category)
                .ok_or_else(|| text_conversion_error(1, format!("unknown category {category}")))?,
            suggestion: row.get(2)?,
            duration: row.get(3)?,
            sentiment: sentiment
                .parse::<SentimentLabel>()
                .map_err(|e| text_conversion_error(4, e))?,
        },
        is_completed: row.get(5)?,
        is_saved: row.get(6)?,
        created_at: timestamp_from_sql(7, &row.get::<_, String>(7)?)?,
    })
}

/// Stores a suggestion as open and returns its id.
pub fn insert_suggestion(
    conn: &Connection,
    user: &str,
    record: &SuggestionRecord,
    created_at: DateTime<Utc>,
) -> AppResult<i64> {
    conn.execute(
        r#"
        INSERT INTO suggestions (user, category, suggestion, duration, sentiment, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            user,
            record.category.as_str(),
            record.suggestion,
            record.duration,
            record.sentiment.as_str(),
            timestamp_to_sql(created_at)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    let id = conn.last_insert_rowid();
    debug!("Stored {} suggestion with id {}", record.category, id);
    Ok(id)
}

/// Open suggestions, newest first.
pub fn open_suggestions(
    conn: &Connection,
    user: &str,
    limit: usize,
) -> AppResult<Vec<StoredSuggestion>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, category, suggestion, duration, sentiment, is_completed, is_saved, created_at
            FROM suggestions
            WHERE user = ?1 AND is_completed = 0
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let suggestions = stmt
        .query_map(params![user, limit as i64], suggestion_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(suggestions)
}

/// Updates one flag on a suggestion owned by `user`.
fn set_flag(conn: &Connection, user: &str, id: i64, column: &str) -> AppResult<()> {
    let sql = format!(
        "UPDATE suggestions SET {} = 1 WHERE id = ?1 AND user = ?2",
        column
    );
    let updated = conn
        .execute(&sql, params![id, user])
        .map_err(DatabaseError::Sqlite)?;

    if updated == 0 {
        return Err(DatabaseError::NotFound(format!("Suggestion with id {} not found", id)).into());
    }
    Ok(())
}

/// Marks a suggestion as done.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if `user` has no suggestion `id`.
pub fn complete_suggestion(conn: &Connection, user: &str, id: i64) -> AppResult<()> {
    set_flag(conn, user, id, "is_completed")?;
    info!("Completed suggestion {}", id);
    Ok(())
}

/// Marks a suggestion as saved.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if `user` has no suggestion `id`.
pub fn save_suggestion(conn: &Connection, user: &str, id: i64) -> AppResult<()> {
    set_flag(conn, user, id, "is_saved")?;
    info!("Saved suggestion {}", id);
    Ok(())
}

/// Highest suggestion id for `user`, if any.
pub fn latest_suggestion_id(conn: &Connection, user: &str) -> AppResult<Option<i64>> {
    conn.query_row(
        "SELECT MAX(id) FROM suggestions WHERE user = ?1",
        params![user],
        |row| row.get(0),
    )
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Completes every open suggestion with an id up to `through_id`.
///
/// A refresh passes the last id that existed before new suggestions were
/// generated, so the fresh ones stay open. Returns the number closed.
pub fn complete_open_suggestions(conn: &Connection, user: &str, through_id: i64) -> AppResult<usize> {
    let closed = conn
        .execute(
            "UPDATE suggestions SET is_completed = 1 WHERE user = ?1 AND is_completed = 0 AND id <= ?2",
            params![user, through_id],
        )
        .map_err(DatabaseError::Sqlite)?;

    info!("Closed {} previous suggestions", closed);
    Ok(closed)
}
