//! Binary polarity classification of free text.
//!
//! The engine only depends on the [`SentimentClassifier`] trait. The shipped
//! adapter runs an SST-2 style sequence classifier (two logits, NEGATIVE then
//! POSITIVE) exported to ONNX.

use crate::errors::{AIError, AppError, AppResult};
use crate::inference::ModelArtifacts;
use ndarray::Array2;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

/// Longest input the classifier sees; longer texts are cut.
const MAX_INPUT_TOKENS: usize = 512;

/// Direction of a sentiment judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Classifier output: polarity plus confidence in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    pub polarity: Polarity,
    pub confidence: f32,
}

impl Sentiment {
    pub fn new(polarity: Polarity, confidence: f32) -> Self {
        Self {
            polarity,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// `+confidence` for positive text, `-confidence` for negative text.
    pub fn signed_score(&self) -> f64 {
        let confidence = f64::from(self.confidence);
        match self.polarity {
            Polarity::Positive => confidence,
            Polarity::Negative => -confidence,
        }
    }
}

/// Scores a text as positive or negative.
///
/// Implementations may be slow; callers do not impose a timeout.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> AppResult<Sentiment>;
}

/// Stand-in used when no classifier model could be loaded.
///
/// Every call fails, so text signals drop out of the aggregate while mood
/// ratings still count.
#[derive(Debug, Clone)]
pub struct UnavailableClassifier {
    reason: String,
}

impl UnavailableClassifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SentimentClassifier for UnavailableClassifier {
    fn classify(&self, _text: &str) -> AppResult<Sentiment> {
        Err(AppError::Sentiment(format!(
            "classifier unavailable: {}",
            self.reason
        )))
    }
}

/// ONNX sequence classifier with a HuggingFace tokenizer.
pub struct OnnxSentimentClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl OnnxSentimentClassifier {
    /// Loads `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> AppResult<Self> {
        let (session, mut tokenizer) = ModelArtifacts::in_dir(model_dir).load()?;
        cap_input_length(&mut tokenizer)?;
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn logits(&self, text: &str) -> AppResult<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| AppError::Sentiment(format!("tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = input_ids.len();

        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| AppError::Sentiment(format!("failed to shape input_ids: {e}")))?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
            .map_err(|e| AppError::Sentiment(format!("failed to shape attention_mask: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| AIError::Inference(format!("classifier session lock poisoned: {e}")))?;

        let input_ids_tensor = TensorRef::from_array_view(&input_ids_array)
            .map_err(|e| AIError::Inference(format!("failed to create input_ids tensor: {e}")))?;
        let attention_mask_tensor = TensorRef::from_array_view(&attention_mask_array).map_err(
            |e| AIError::Inference(format!("failed to create attention_mask tensor: {e}")),
        )?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            ])
            .map_err(|e| AIError::Inference(format!("classifier inference failed: {e}")))?;

        // Shape [1, 2]
        let (_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AIError::Inference(format!("failed to extract logits: {e}")))?;

        Ok(data.to_vec())
    }
}

impl SentimentClassifier for OnnxSentimentClassifier {
    fn classify(&self, text: &str) -> AppResult<Sentiment> {
        let logits = self.logits(text)?;
        let sentiment = sentiment_from_logits(&logits)?;
        debug!(
            "Classified text as {:?} ({:.3})",
            sentiment.polarity, sentiment.confidence
        );
        Ok(sentiment)
    }
}

/// Truncates encodings to [`MAX_INPUT_TOKENS`] inside the tokenizer so the
/// closing special token survives on long inputs.
fn cap_input_length(tokenizer: &mut Tokenizer) -> AppResult<()> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_INPUT_TOKENS,
            ..TruncationParams::default()
        }))
        .map_err(|e| AppError::Sentiment(format!("failed to configure truncation: {e}")))?;
    Ok(())
}

/// Turns `[negative, positive]` logits into the winning label and its softmax probability.
fn sentiment_from_logits(logits: &[f32]) -> AppResult<Sentiment> {
    let [negative, positive] = logits else {
        return Err(AppError::Sentiment(format!(
            "expected 2 logits, got {}",
            logits.len()
        )));
    };

    let max = negative.max(*positive);
    let neg_exp = (negative - max).exp();
    let pos_exp = (positive - max).exp();
    let total = neg_exp + pos_exp;

    if positive > negative {
        Ok(Sentiment::new(Polarity::Positive, pos_exp / total))
    } else {
        Ok(Sentiment::new(Polarity::Negative, neg_exp / total))
    }
}
