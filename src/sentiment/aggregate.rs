//! Aggregation of heterogeneous signals into one sentiment estimate.
//!
//! Mood ratings enter the pool as their raw 1–5 ordinal by default, while
//! classified texts enter as signed confidences in `[-1, 1]`. The two scales
//! are not reconciled, so the resulting value is a relative indicator rather
//! than a calibrated score. In particular any pool made only of mood ratings
//! averages at least 1.0 and is labelled positive. [`MoodScale::Centered`]
//! is available for callers that want ratings mapped onto `[-1, 1]` instead.

use crate::constants::{NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD};
use crate::errors::{AppError, AppResult};
use crate::models::{ChatMessage, MoodSample, SentimentLabel, TextSample};
use crate::sentiment::classifier::SentimentClassifier;
use std::str::FromStr;
use tracing::{debug, warn};

/// How a mood rating is turned into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodScale {
    /// The 1–5 ordinal, unchanged.
    #[default]
    Raw,
    /// `(ordinal - 3) / 2`, i.e. very sad = -1.0 and very happy = 1.0.
    Centered,
}

impl MoodScale {
    fn score(self, sample: &MoodSample) -> f64 {
        let ordinal = f64::from(sample.mood.ordinal());
        match self {
            MoodScale::Raw => ordinal,
            MoodScale::Centered => (ordinal - 3.0) / 2.0,
        }
    }
}

impl FromStr for MoodScale {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(MoodScale::Raw),
            "centered" | "centred" => Ok(MoodScale::Centered),
            other => Err(AppError::Config(format!(
                "Invalid mood scale '{}'. Expected 'raw' or 'centered'",
                other
            ))),
        }
    }
}

/// Mean of the contributing scores and its label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSentiment {
    pub value: f64,
    pub label: SentimentLabel,
}

impl AggregateSentiment {
    /// Labels `value` with the -0.3 / +0.3 cutoffs (both inclusive).
    pub fn from_value(value: f64) -> Self {
        let label = if value <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else if value >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        };
        Self { value, label }
    }

    /// The estimate used when there is no signal at all.
    pub fn neutral() -> Self {
        Self {
            value: 0.0,
            label: SentimentLabel::Neutral,
        }
    }

    /// Mean of `scores`, or [`AggregateSentiment::neutral`] for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::neutral();
        }
        Self::from_value(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Combines mood, journal and chat signals.
pub struct SentimentAggregator<'a> {
    classifier: &'a dyn SentimentClassifier,
    mood_scale: MoodScale,
}

impl<'a> SentimentAggregator<'a> {
    pub fn new(classifier: &'a dyn SentimentClassifier) -> Self {
        Self {
            classifier,
            mood_scale: MoodScale::default(),
        }
    }

    pub fn with_mood_scale(mut self, mood_scale: MoodScale) -> Self {
        self.mood_scale = mood_scale;
        self
    }

    /// Scores every signal and averages the pool.
    ///
    /// Only assistant-authored chat messages are scored: the goal is the tone
    /// of the conversation's replies, not the user's own venting. A text the
    /// classifier cannot score is logged and left out of the pool.
    pub fn aggregate(
        &self,
        moods: &[MoodSample],
        journals: &[TextSample],
        chats: &[ChatMessage],
    ) -> AggregateSentiment {
        let mut scores: Vec<f64> = moods.iter().map(|m| self.mood_scale.score(m)).collect();

        scores.extend(journals.iter().filter_map(|j| self.score_text(&j.text)));
        scores.extend(
            chats
                .iter()
                .filter(|c| !c.is_user())
                .filter_map(|c| self.score_text(&c.text)),
        );

        let aggregate = AggregateSentiment::from_scores(&scores);
        debug!(
            "Aggregated {} scores into {:.3} ({})",
            scores.len(),
            aggregate.value,
            aggregate.label
        );
        aggregate
    }

    fn score_text(&self, text: &str) -> Option<f64> {
        match self.classifier.classify(text) {
            Ok(sentiment) => Some(sentiment.signed_score()),
            Err(e) => {
                warn!("Skipping sample the classifier could not score: {}", e);
                None
            }
        }
    }
}
