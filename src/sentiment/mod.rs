//! Sentiment scoring for mood, journal and chat signals.
//!
//! - `classifier`: the polarity classifier boundary and its ONNX adapter
//! - `aggregate`: combines per-signal scores into one [`AggregateSentiment`]

pub mod aggregate;
pub mod classifier;

pub use aggregate::{AggregateSentiment, MoodScale, SentimentAggregator};
pub use classifier::{
    OnnxSentimentClassifier, Polarity, Sentiment, SentimentClassifier, UnavailableClassifier,
};
