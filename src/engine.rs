//! Orchestration of the suggestion, insight and chat operations.
//!
//! The engine reads signals from a [`WellnessStore`], scores them with a
//! [`SentimentClassifier`], and talks to a [`TextGenerator`]. Its public
//! operations do not fail on backend or store trouble: suggestions degrade
//! to an empty list and text degrades to fallback or canned replies.

use crate::ai::prompts::{chat_history_context, mood_insight_prompt, suggestion_prompt};
use crate::ai::{parse_suggestions, TextGenerator};
use crate::constants::{
    CHAT_HISTORY_LIMIT, MOOD_ENCOURAGEMENT_MESSAGE, NO_MOOD_ENTRIES_MESSAGE, RECENT_CHAT_LIMIT,
    RECENT_SIGNAL_LIMIT,
};
use crate::errors::{AppError, AppResult};
use crate::models::{MoodSample, SuggestionRecord, TextSample};
use crate::sentiment::{MoodScale, SentimentAggregator, SentimentClassifier};
use crate::store::WellnessStore;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// An assistant reply to one chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    /// The text came from a fallback pool rather than the model.
    pub degraded: bool,
    /// Seconds spent generating.
    pub response_time: f64,
}

pub struct SuggestionEngine {
    store: Arc<dyn WellnessStore>,
    classifier: Arc<dyn SentimentClassifier>,
    generator: Arc<dyn TextGenerator>,
    mood_scale: MoodScale,
}

impl SuggestionEngine {
    pub fn new(
        store: Arc<dyn WellnessStore>,
        classifier: Arc<dyn SentimentClassifier>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            classifier,
            generator,
            mood_scale: MoodScale::default(),
        }
    }

    pub fn with_mood_scale(mut self, mood_scale: MoodScale) -> Self {
        self.mood_scale = mood_scale;
        self
    }

    /// Generates and stores personalized self-care suggestions for `user`.
    ///
    /// When `moods` or `journals` is `None` or empty, the most recent entries
    /// are read from the store instead. Every parsed suggestion is appended
    /// to the store once and returned. Any failure along the way is logged
    /// and yields an empty list.
    pub fn generate_suggestions(
        &self,
        user: &str,
        moods: Option<&[MoodSample]>,
        journals: Option<&[TextSample]>,
    ) -> Vec<SuggestionRecord> {
        match self.try_generate_suggestions(user, moods, journals) {
            Ok(records) => {
                info!("Generated {} suggestions", records.len());
                records
            }
            Err(e) => {
                error!("Suggestion generation failed: {}", e);
                Vec::new()
            }
        }
    }

    fn try_generate_suggestions(
        &self,
        user: &str,
        moods: Option<&[MoodSample]>,
        journals: Option<&[TextSample]>,
    ) -> AppResult<Vec<SuggestionRecord>> {
        let moods = match moods {
            Some(moods) if !moods.is_empty() => Cow::Borrowed(moods),
            _ => Cow::Owned(self.store.recent_moods(user, RECENT_SIGNAL_LIMIT)?),
        };
        let journals = match journals {
            Some(journals) if !journals.is_empty() => Cow::Borrowed(journals),
            _ => Cow::Owned(self.store.recent_journals(user, RECENT_SIGNAL_LIMIT)?),
        };
        let chats = self.store.recent_chats(user, RECENT_CHAT_LIMIT, true)?;
        debug!(
            "Suggestion signals: {} moods, {} journals, {} chats",
            moods.len(),
            journals.len(),
            chats.len()
        );

        let sentiment = SentimentAggregator::new(self.classifier.as_ref())
            .with_mood_scale(self.mood_scale)
            .aggregate(&moods, &journals, &chats);

        let prompt = suggestion_prompt(sentiment.label, &journals, &chats);
        let generation = self.generator.generate(&prompt, None);
        if generation.is_fallback() {
            warn!("Suggestion request answered with fallback text");
        }

        let text = generation.text();
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for candidate in parse_suggestions(text) {
            let record = SuggestionRecord::from_candidate(candidate, sentiment.label);
            self.store.append_suggestion(user, &record)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Produces a short supportive reading of `moods`.
    ///
    /// Returns a fixed message when there is nothing to analyse.
    pub fn generate_mood_insight(&self, moods: &[MoodSample]) -> String {
        if moods.is_empty() {
            return NO_MOOD_ENTRIES_MESSAGE.to_string();
        }

        let prompt = mood_insight_prompt(moods);
        let text = self.generator.generate(&prompt, None).into_text();
        if text.trim().is_empty() {
            return MOOD_ENCOURAGEMENT_MESSAGE.to_string();
        }
        text
    }

    /// Answers `message` in the context of the user's recent conversation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank message. Store and backend
    /// failures do not surface: history is skipped and the reply degrades.
    pub fn generate_chat_reply(&self, user: &str, message: &str) -> AppResult<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Message cannot be empty".to_string()));
        }

        let history = match self.store.recent_chats(user, CHAT_HISTORY_LIMIT, false) {
            Ok(history) => history,
            Err(e) => {
                warn!("Continuing without chat history: {}", e);
                Vec::new()
            }
        };
        let context = chat_history_context(&history);

        let start = Instant::now();
        let generation = self.generator.generate(message, Some(&context));
        let response_time = start.elapsed().as_secs_f64();

        Ok(ChatReply {
            degraded: generation.is_fallback(),
            text: generation.into_text(),
            response_time,
        })
    }
}
