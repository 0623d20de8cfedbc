//! The persistence interface the engine reads signals from and writes
//! suggestions to.
//!
//! Reads return the most recent rows first. [`crate::db::Database`] is the
//! SQLite implementation; tests use in-memory fakes.

use crate::errors::AppResult;
use crate::models::{ChatMessage, MoodSample, SuggestionRecord, TextSample};

pub trait WellnessStore: Send + Sync {
    /// Up to `limit` mood samples, newest first.
    fn recent_moods(&self, user: &str, limit: usize) -> AppResult<Vec<MoodSample>>;

    /// Up to `limit` journal entries, newest first.
    fn recent_journals(&self, user: &str, limit: usize) -> AppResult<Vec<TextSample>>;

    /// Up to `limit` chat messages, newest first. With `assistant_only` the
    /// limit applies after user turns are filtered out.
    fn recent_chats(
        &self,
        user: &str,
        limit: usize,
        assistant_only: bool,
    ) -> AppResult<Vec<ChatMessage>>;

    /// Persists one generated suggestion and returns its id.
    fn append_suggestion(&self, user: &str, record: &SuggestionRecord) -> AppResult<i64>;
}
