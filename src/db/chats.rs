//! Chat turn storage.

use crate::db::{timestamp_from_sql, timestamp_to_sql};
use crate::errors::{AppResult, DatabaseError};
use crate::models::{Author, ChatMessage};
use rusqlite::{params, Connection};
use tracing::debug;

/// Stores one chat turn and returns its id.
pub fn insert_chat_message(conn: &Connection, user: &str, message: &ChatMessage) -> AppResult<i64> {
    debug!("Inserting {:?} chat message", message.author);

    conn.execute(
        r#"
        INSERT INTO chat_messages (user, message, is_user, is_error, response_time, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            user,
            message.text,
            message.is_user(),
            message.is_error,
            message.response_time,
            timestamp_to_sql(message.created_at)
        ],
    )
    .map_err(DatabaseError::Sqlite)?;

    Ok(conn.last_insert_rowid())
}

/// Most recent chat turns, newest first.
///
/// With `assistant_only`, user turns are excluded before the limit applies.
pub fn recent_chats(
    conn: &Connection,
    user: &str,
    limit: usize,
    assistant_only: bool,
) -> AppResult<Vec<ChatMessage>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT message, is_user, is_error, response_time, created_at
            FROM chat_messages
            WHERE user = ?1 AND (?2 = 0 OR is_user = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let chats = stmt
        .query_map(params![user, assistant_only, limit as i64], |row| {
            let is_user: bool = row.get(1)?;
            Ok(ChatMessage {
                text: row.get(0)?,
                author: if is_user {
                    Author::User
                } else {
                    Author::Assistant
                },
                is_error: row.get(2)?,
                response_time: row.get(3)?,
                created_at: timestamp_from_sql(4, &row.get::<_, String>(4)?)?,
            })
        })
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    Ok(chats)
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

    fn seed(conn: &Connection) {
        let start = Utc::now();
        let turns = [
            ChatMessage::user("hello", start),
            ChatMessage::assistant("hi, how are you?", start + Duration::seconds(1)),
            ChatMessage::user("tired", start + Duration::seconds(2)),
            ChatMessage {
                is_error: true,
                response_time: Some(0.25),
                ..ChatMessage::assistant("rest helps", start + Duration::seconds(3))
            },
        ];
        for turn in &turns {
            insert_chat_message(conn, "ana", turn).unwrap();
        }
    }

    #[test]
    fn test_recent_chats_both_authors() {
        let conn = setup();
        seed(&conn);

        let chats = recent_chats(&conn, "ana", 3, false).unwrap();
        let texts: Vec<&str> = chats.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["rest helps", "tired", "hi, how are you?"]);
        assert!(chats[1].is_user());
    }

    #[test]
    fn test_recent_chats_assistant_only() {
        let conn = setup();
        seed(&conn);

        let chats = recent_chats(&conn, "ana", 10, true).unwrap();
        assert_eq!(chats.len(), 2);
        assert!(chats.iter().all(|c| c.author == Author::Assistant));
        assert!(chats[0].is_error);
        assert_eq!(chats[0].response_time, Some(0.25));
    }
}
