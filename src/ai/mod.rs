//! Text generation for suggestions, insights and chat replies.
//!
//! Two backends implement [`TextGenerator`]: a remote OpenAI-compatible chat
//! completions client and a local ONNX causal language model. Both fall back
//! to canned replies instead of failing.
//!
//! # Module Structure
//!
//! - `backend`: The `TextGenerator` trait and `Generation` outcome
//! - `fallback`: Canned reply pools
//! - `remote`: HTTP client for chat completions
//! - `local`: ONNX model provider and local backend
//! - `sampling`: Token sampling for the local backend
//! - `prompts`: System prompt and prompt builders
//! - `parser`: Suggestion list parsing
//!
//! # Example
//!
//! ```no_run
//! use solace::ai::build_generator;
//! use solace::Config;
//!
//! let config = Config::load()?;
//! let generator = build_generator(&config)?;
//! println!("{}", generator.generate("Hello", None).text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod fallback;
pub mod local;
pub mod parser;
pub mod prompts;
pub mod remote;
pub mod sampling;

// Re-export commonly used types
pub use backend::{Generation, TextGenerator};
pub use fallback::FallbackPool;
pub use local::{LocalBackend, ModelProvider};
pub use parser::parse_suggestions;
pub use prompts::{chat_history_context, mood_insight_prompt, suggestion_prompt, SYSTEM_PROMPT};
pub use remote::{Message, RemoteBackend};

use crate::config::{BackendKind, Config};
use crate::errors::AppResult;
use std::sync::Arc;
use tracing::info;

/// Builds the backend selected by `config`.
///
/// Nothing is loaded or contacted here: a missing key or missing model only
/// shows up as fallback text on the first call.
pub fn build_generator(config: &Config) -> AppResult<Arc<dyn TextGenerator>> {
    let backend = config.effective_backend();
    info!("Using {:?} generation backend", backend);

    match backend {
        BackendKind::Local => {
            let provider = Arc::new(ModelProvider::from_dir(config.model_dir.clone()));
            Ok(Arc::new(LocalBackend::new(provider)))
        }
        // Auto is resolved by effective_backend.
        BackendKind::Remote | BackendKind::Auto => Ok(Arc::new(RemoteBackend::new(
            config.api_base.clone(),
            config.chat_model.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_generator_selects_backend() {
        let local = Config {
            backend: BackendKind::Auto,
            model_dir: PathBuf::from("/nonexistent/model"),
            ..Config::default()
        };
        assert_eq!(build_generator(&local).unwrap().name(), "local");

        let remote = Config {
            api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        assert_eq!(build_generator(&remote).unwrap().name(), "remote");

        let forced = Config {
            backend: BackendKind::Remote,
            ..Config::default()
        };
        assert_eq!(build_generator(&forced).unwrap().name(), "remote");
    }

    #[test]
    fn test_unconfigured_backends_still_answer() {
        let config = Config {
            backend: BackendKind::Remote,
            ..Config::default()
        };
        let generation = build_generator(&config).unwrap().generate("hi", None);

        assert!(generation.is_fallback());
        assert!(!generation.text().is_empty());
    }
}
