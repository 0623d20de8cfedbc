//! The SQLite database used through the `WellnessStore` interface.

use chrono::{Duration, Utc};
use solace::db::{chats, journals, moods, suggestions, Database};
use solace::models::{
    Category, ChatMessage, Mood, MoodSample, SentimentLabel, SuggestionCandidate,
    SuggestionRecord, TextSample,
};
use solace::store::WellnessStore;
use tempfile::TempDir;

fn open_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(&temp_dir.path().join("solace.db")).unwrap();
    db.initialize_schema().unwrap();
    (temp_dir, db)
}

fn record(text: &str) -> SuggestionRecord {
    SuggestionRecord::from_candidate(
        SuggestionCandidate {
            category: Category::Physical,
            text: text.to_string(),
            duration: "10 minutes".to_string(),
        },
        SentimentLabel::Positive,
    )
}

#[test]
fn test_store_reads_newest_first_per_user() {
    let (_temp_dir, db) = open_db();
    let start = Utc::now();
    {
        let conn = db.get_conn().unwrap();
        for (i, mood) in [Mood::Sad, Mood::Neutral, Mood::Happy].into_iter().enumerate() {
            moods::insert_mood(&conn, "ana", &MoodSample::new(mood, start + Duration::seconds(i as i64)))
                .unwrap();
        }
        moods::insert_mood(&conn, "ben", &MoodSample::new(Mood::VerySad, start)).unwrap();
        journals::insert_journal(&conn, "ana", &TextSample::new("walked", start)).unwrap();
    }

    let store: &dyn WellnessStore = &db;
    let recent = store.recent_moods("ana", 2).unwrap();
    assert_eq!(
        recent.iter().map(|m| m.mood).collect::<Vec<_>>(),
        vec![Mood::Happy, Mood::Neutral]
    );
    assert_eq!(store.recent_journals("ana", 5).unwrap().len(), 1);
    assert!(store.recent_journals("ben", 5).unwrap().is_empty());
}

#[test]
fn test_assistant_only_chat_limit_applies_after_filter() {
    let (_temp_dir, db) = open_db();
    let start = Utc::now();
    {
        let conn = db.get_conn().unwrap();
        chats::insert_chat_message(&conn, "ana", &ChatMessage::assistant("first reply", start))
            .unwrap();
        for i in 1..=4 {
            chats::insert_chat_message(
                &conn,
                "ana",
                &ChatMessage::user(format!("msg {i}"), start + Duration::seconds(i)),
            )
            .unwrap();
        }
    }

    let replies = db.recent_chats("ana", 2, true).unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, "first reply");

    let everything = db.recent_chats("ana", 2, false).unwrap();
    assert_eq!(everything[0].text, "msg 4");
}

#[test]
fn test_appended_suggestions_are_open() {
    let (_temp_dir, db) = open_db();

    let first = db.append_suggestion("ana", &record("Stretch")).unwrap();
    let second = db.append_suggestion("ana", &record("Walk")).unwrap();
    assert!(second > first);

    let conn = db.get_conn().unwrap();
    let open = suggestions::open_suggestions(&conn, "ana", 10).unwrap();
    assert_eq!(open.len(), 2);
    assert_eq!(open[0].id, second);
    assert_eq!(open[0].record.suggestion, "Walk (Duration: 10 minutes)");
    assert_eq!(open[0].record.sentiment, SentimentLabel::Positive);
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("solace.db");
    {
        let db = Database::open(&path).unwrap();
        db.initialize_schema().unwrap();
        db.append_suggestion("ana", &record("Stretch")).unwrap();
    }

    let db = Database::open(&path).unwrap();
    db.initialize_schema().unwrap();
    let conn = db.get_conn().unwrap();
    assert_eq!(suggestions::latest_suggestion_id(&conn, "ana").unwrap(), Some(1));
}
