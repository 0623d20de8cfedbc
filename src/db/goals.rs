//! Wellness goal and progress storage.

use crate::db::{text_conversion_error, timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::ops::goals::{GoalFrequency, GoalProgress, GoalType, NewGoal, WellnessGoal};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_from_sql(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<WellnessGoal> {
    let goal_type: String = row.get(1)?;
    let frequency: String = row.get(4)?;
    let end_date: Option<String> = row.get(6)?;
    let last_check_in: Option<String> = row.get(8)?;

    Ok(WellnessGoal {
        id: row.get(0)?,
        goal_type: goal_type
            .parse::<GoalType>()
            .map_err(|e| text_conversion_error(1, e))?,
        custom_goal: row.get(2)?,
        target: row.get(3)?,
        frequency: frequency
            .parse::<GoalFrequency>()
            .map_err(|e| text_conversion_error(4, e))?,
        start_date: date_from_sql(5, &row.get::<_, String>(5)?)?,
        end_date: end_date.map(|d| date_from_sql(6, &d)).transpose()?,
        is_active: row.get(7)?,
        last_check_in: last_check_in
            .map(|t| timestamp_from_sql(8, &t))
            .transpose()?,
        streak_count: row.get(9)?,
        notes: row.get(10)?,
    })
}

const GOAL_COLUMNS: &str = "id, goal_type, custom_goal, target, frequency, start_date, end_date, \
                            is_active, last_check_in, streak_count, notes";

/// Stores a validated goal starting on `start_date` and returns its id.
pub fn insert_goal(
    conn: &Connection,
    user: &str,
    goal: &NewGoal,
    start_date: NaiveDate,
) -> AppResult<i64> {
    goal.validate()?;

    conn.execute(
        r#"
        INSERT INTO goals (user, goal_type, custom_goal, target, frequency, start_date, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            user,
            goal.goal_type.as_str(),
            goal.custom_goal,
            goal.target.trim(),
            goal.frequency.as_str(),
            start_date.format(DATE_FORMAT).to_string(),
            goal.notes
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    let id = conn.last_insert_rowid();
    debug!("Stored {} goal with id {}", goal.goal_type, id);
    Ok(id)
}

/// Goals for `user`, active ones first.
pub fn list_goals(conn: &Connection, user: &str) -> AppResult<Vec<WellnessGoal>> {
    let sql = format!(
        "SELECT {} FROM goals WHERE user = ?1 ORDER BY is_active DESC, id ASC",
        GOAL_COLUMNS
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::Sqlite)?;

    let goals = stmt
        .query_map(params![user], goal_from_row)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(goals)
}

/// Looks up one goal owned by `user`.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` if there is no such goal.
pub fn get_goal(conn: &Connection, user: &str, id: i64) -> AppResult<WellnessGoal> {
    let sql = format!("SELECT {} FROM goals WHERE id = ?1 AND user = ?2", GOAL_COLUMNS);
    conn.query_row(&sql, params![id, user], goal_from_row)
        .optional()
        .map_err(DatabaseError::Sqlite)?
        .ok_or_else(|| DatabaseError::NotFound(format!("Goal with id {} not found", id)).into())
}

/// Persists the streak fields and active flag of `goal`.
pub fn update_goal_state(conn: &Connection, user: &str, goal: &WellnessGoal) -> AppResult<()> {
    let updated = conn
        .execute(
            r#"
            UPDATE goals
            SET streak_count = ?1, last_check_in = ?2, is_active = ?3
            WHERE id = ?4 AND user = ?5
            "#,
            params![
                goal.streak_count,
                goal.last_check_in.map(timestamp_to_sql),
                goal.is_active,
                goal.id,
                user
            ],
        )
        .map_err(DatabaseError::Sqlite)?;

    if updated == 0 {
        return Err(DatabaseError::NotFound(format!("Goal with id {} not found", goal.id)).into());
    }
    Ok(())
}

/// Records the progress for a day, replacing an earlier report for the same day.
pub fn upsert_progress(conn: &Connection, progress: &GoalProgress) -> AppResult<()> {
    conn.execute(
        r#"
        INSERT INTO goal_progress (goal_id, date, progress, completed, notes)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(goal_id, date) DO UPDATE SET
            progress = excluded.progress,
            completed = excluded.completed,
            notes = excluded.notes
        "#,
        params![
            progress.goal_id,
            progress.date.format(DATE_FORMAT).to_string(),
            progress.progress,
            progress.completed,
            progress.notes
        ],
    )
    .map_err(DatabaseError::Sqlite)?;
    Ok(())
}

/// Progress reports for a goal, newest day first.
pub fn progress_for_goal(conn: &Connection, goal_id: i64) -> AppResult<Vec<GoalProgress>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT goal_id, date, progress, completed, notes
            FROM goal_progress
            WHERE goal_id = ?1
            ORDER BY date DESC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let progress = stmt
        .query_map(params![goal_id], |row| {
            Ok(GoalProgress {
                goal_id: row.get(0)?,
                date: date_from_sql(1, &row.get::<_, String>(1)?)?,
                progress: row.get(2)?,
                completed: row.get(3)?,
                notes: row.get(4)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(progress)
}
