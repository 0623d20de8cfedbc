//! Mood rating storage.

use crate::db::{text_conversion_error, timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Mood, MoodSample};
use rusqlite::{params, Connection, Row};
use tracing::debug;

fn mood_from_row(row: &Row<'_>) -> rusqlite::Result<MoodSample> {
    let mood: String = row.get(0)?;
    Ok(MoodSample {
        mood: mood.parse::<Mood>().map_err(|e| text_conversion_error(0, e))?,
        notes: row.get(1)?,
        created_at: timestamp_from_sql(2, &row.get::<_, String>(2)?)?,
    })
}

/// Stores a mood rating and returns its id.
pub fn insert_mood(conn: &Connection, user: &str, sample: &MoodSample) -> AppResult<i64> {
    debug!("Inserting mood {} for user", sample.mood);

    conn.execute(
        "INSERT INTO moods (user, mood, notes, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user,
            sample.mood.as_str(),
            sample.notes,
            timestamp_to_sql(sample.created_at)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(conn.last_insert_rowid())
}

/// Most recent mood ratings, newest first.
pub fn recent_moods(conn: &Connection, user: &str, limit: usize) -> AppResult<Vec<MoodSample>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT mood, notes, created_at
            FROM moods
            WHERE user = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let moods = stmt
        .query_map(params![user, limit as i64], mood_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(moods)
}

/// Every mood rating for `user`, oldest first.
pub fn mood_history(conn: &Connection, user: &str) -> AppResult<Vec<MoodSample>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT mood, notes, created_at
            FROM moods
            WHERE user = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let moods = stmt
        .query_map(params![user], mood_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(moods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use chrono::{Duration, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn test_recent_moods_newest_first_and_limited() {
        let conn = setup();
        let start = Utc::now();
        for (i, mood) in [Mood::Sad, Mood::Neutral, Mood::Happy].into_iter().enumerate() {
            insert_mood(&conn, "ana", &MoodSample::new(mood, start + Duration::minutes(i as i64)))
                .unwrap();
        }

        let recent = recent_moods(&conn, "ana", 2).unwrap();
        assert_eq!(
            recent.iter().map(|m| m.mood).collect::<Vec<_>>(),
            vec![Mood::Happy, Mood::Neutral]
        );
    }

    #[test]
    fn test_moods_are_per_user() {
        let conn = setup();
        insert_mood(&conn, "ana", &MoodSample::new(Mood::Happy, Utc::now())).unwrap();

        assert!(recent_moods(&conn, "ben", 5).unwrap().is_empty());
        assert_eq!(mood_history(&conn, "ana").unwrap().len(), 1);
    }

    #[test]
    fn test_history_is_chronological_and_keeps_notes() {
        let conn = setup();
        let start = Utc::now();
        let mut later = MoodSample::new(Mood::VeryHappy, start + Duration::hours(1));
        later.notes = "good news".to_string();
        insert_mood(&conn, "ana", &later).unwrap();
        insert_mood(&conn, "ana", &MoodSample::new(Mood::VerySad, start)).unwrap();

        let history = mood_history(&conn, "ana").unwrap();
        assert_eq!(history[0].mood, Mood::VerySad);
        assert_eq!(history[1].notes, "good news");
    }
}
