//! The text generation capability shared by the remote and local backends.

use crate::ai::fallback::FallbackPool;
use crate::errors::{AIError, AppError, AppResult};
use tracing::{debug, warn};

/// Outcome of a generation call.
///
/// Callers that do not care whether the text is real model output can use
/// [`Generation::text`] and treat both variants alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// Trimmed, non-empty model output.
    Generated(String),
    /// Canned text from the backend's fallback pool.
    Fallback { text: String, reason: String },
}

impl Generation {
    pub fn text(&self) -> &str {
        match self {
            Generation::Generated(text) => text,
            Generation::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Generation::Generated(text) => text,
            Generation::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }
}

/// A natural-language generation backend.
///
/// Implementors supply the fallible [`TextGenerator::try_generate`] and a
/// fallback pool. [`TextGenerator::generate`] is the entry point callers use:
/// it never fails and never returns blank text.
pub trait TextGenerator: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Produces a completion for `prompt`, optionally preceded by prior turns.
    fn try_generate(&self, prompt: &str, history: Option<&str>) -> AppResult<String>;

    fn fallback_pool(&self) -> &FallbackPool;

    fn generate(&self, prompt: &str, history: Option<&str>) -> Generation {
        let error = match self.try_generate(prompt, history) {
            Ok(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    debug!("{} generated {} characters", self.name(), trimmed.len());
                    return Generation::Generated(trimmed.to_string());
                }
                AppError::AI(AIError::EmptyCompletion)
            }
            Err(e) => e,
        };

        warn!("{} generation failed, using fallback: {}", self.name(), error);
        Generation::Fallback {
            text: self.fallback_pool().pick().to_string(),
            reason: error.to_string(),
        }
    }
}
