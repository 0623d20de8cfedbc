//! Signal and suggestion types shared by the engine, the store and the CLI.

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A categorical mood rating, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    VerySad,
    Sad,
    Neutral,
    Happy,
    VeryHappy,
}

impl Mood {
    /// All moods in ordinal order.
    pub const ALL: [Mood; 5] = [
        Mood::VerySad,
        Mood::Sad,
        Mood::Neutral,
        Mood::Happy,
        Mood::VeryHappy,
    ];

    /// Ordinal on the 1 (very sad) to 5 (very happy) scale.
    pub fn ordinal(self) -> u8 {
        match self {
            Mood::VerySad => 1,
            Mood::Sad => 2,
            Mood::Neutral => 3,
            Mood::Happy => 4,
            Mood::VeryHappy => 5,
        }
    }

    /// Inverse of [`Mood::ordinal`].
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Mood::ALL.into_iter().find(|m| m.ordinal() == ordinal)
    }

    /// Stored label, e.g. `very_happy`.
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::VerySad => "very_sad",
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::VeryHappy => "very_happy",
        }
    }

    /// Human-readable label, e.g. `Very Happy`.
    pub fn display_name(self) -> &'static str {
        match self {
            Mood::VerySad => "Very Sad",
            Mood::Sad => "Sad",
            Mood::Neutral => "Neutral",
            Mood::Happy => "Happy",
            Mood::VeryHappy => "Very Happy",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| AppError::Validation(format!("Unknown mood: '{}'", s)))
    }
}

/// One recorded mood rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub mood: Mood,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl MoodSample {
    pub fn new(mood: Mood, created_at: DateTime<Utc>) -> Self {
        Self {
            mood,
            notes: String::new(),
            created_at,
        }
    }
}

/// A journal entry. Only the text and its recency matter to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSample {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TextSample {
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            created_at,
        }
    }
}

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    /// Set when the assistant turn is canned fallback text rather than a real reply.
    pub is_error: bool,
    /// Seconds taken to produce an assistant turn.
    pub response_time: Option<f64>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            author: Author::User,
            created_at,
            is_error: false,
            response_time: None,
        }
    }

    pub fn assistant(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            author: Author::Assistant,
            created_at,
            is_error: false,
            response_time: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// Trichotomous emotional-state estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "positive" => Ok(SentimentLabel::Positive),
            other => Err(AppError::Validation(format!(
                "Unknown sentiment label: '{}'",
                other
            ))),
        }
    }
}

/// Self-care suggestion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Relaxation,
    Physical,
    Social,
    Mindfulness,
    Creative,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Relaxation,
        Category::Physical,
        Category::Social,
        Category::Mindfulness,
        Category::Creative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Relaxation => "relaxation",
            Category::Physical => "physical",
            Category::Social => "social",
            Category::Mindfulness => "mindfulness",
            Category::Creative => "creative",
        }
    }

    /// Matches an already trimmed, lower-cased category token.
    pub fn from_token(token: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, validated, not-yet-persisted suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionCandidate {
    pub category: Category,
    pub text: String,
    pub duration: String,
}

/// A suggestion ready to be stored, in the shape callers consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub category: Category,
    /// Suggestion text with the duration appended, e.g. `Walk (Duration: 10 minutes)`.
    pub suggestion: String,
    pub duration: String,
    pub sentiment: SentimentLabel,
}

impl SuggestionRecord {
    pub fn from_candidate(candidate: SuggestionCandidate, sentiment: SentimentLabel) -> Self {
        Self {
            category: candidate.category,
            suggestion: format!("{} (Duration: {})", candidate.text, candidate.duration),
            duration: candidate.duration,
            sentiment,
        }
    }
}

/// A suggestion as held by the store, with its lifecycle flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSuggestion {
    pub id: i64,
    pub record: SuggestionRecord,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub is_saved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_ordinals_round_trip() {
        for mood in Mood::ALL {
            assert_eq!(Mood::from_ordinal(mood.ordinal()), Some(mood));
        }
        assert_eq!(Mood::from_ordinal(0), None);
        assert_eq!(Mood::from_ordinal(6), None);
    }

    #[test]
    fn test_mood_from_str_accepts_variants() {
        assert_eq!("very_happy".parse::<Mood>().unwrap(), Mood::VeryHappy);
        assert_eq!("Very Sad".parse::<Mood>().unwrap(), Mood::VerySad);
        assert_eq!("very-happy".parse::<Mood>().unwrap(), Mood::VeryHappy);
        assert!(matches!(
            "ecstatic".parse::<Mood>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_category_from_token() {
        assert_eq!(Category::from_token("social"), Some(Category::Social));
        assert_eq!(Category::from_token("Social"), None);
        assert_eq!(Category::from_token("unknown"), None);
    }

    #[test]
    fn test_record_from_candidate_appends_duration() {
        let candidate = SuggestionCandidate {
            category: Category::Physical,
            text: "Go for a walk".to_string(),
            duration: "15 minutes".to_string(),
        };

        let record = SuggestionRecord::from_candidate(candidate, SentimentLabel::Neutral);

        assert_eq!(record.category, Category::Physical);
        assert_eq!(record.suggestion, "Go for a walk (Duration: 15 minutes)");
        assert_eq!(record.duration, "15 minutes");
        assert_eq!(record.sentiment, SentimentLabel::Neutral);
    }

    #[test]
    fn test_record_serializes_to_caller_shape() {
        let record = SuggestionRecord {
            category: Category::Creative,
            suggestion: "Sketch (Duration: 5 minutes)".to_string(),
            duration: "5 minutes".to_string(),
            sentiment: SentimentLabel::Positive,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "creative");
        assert_eq!(json["sentiment"], "positive");
        assert_eq!(json["duration"], "5 minutes");
    }
}
