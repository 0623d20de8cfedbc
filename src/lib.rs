/*!
# Solace

Solace is an adaptive self-care suggestion engine. It reads a user's recent
mood ratings, journal entries and assistant chat messages, reduces them to a
coarse emotional state, and asks a text-generation backend for short,
categorized self-care suggestions. The same backend writes mood insights and
chat replies.

## Core Features

- Sentiment aggregation over moods, journal text and chat text
- Remote (OpenAI-compatible) or local (ONNX) text generation with canned fallbacks
- Tolerant parsing of `category|suggestion|duration` lines
- SQLite storage of signals, suggestions and wellness goals

## Architecture

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `errors`: Error handling infrastructure
- `models`: Signal and suggestion types
- `sentiment`: Classifier seam and aggregation
- `ai`: Text generation backends, prompts and the suggestion parser
- `engine`: Suggestion, insight and chat orchestration
- `store`, `db`: Storage interface and its SQLite implementation
- `ops`: Mood statistics and wellness goals

## Usage Example

```rust,no_run
use solace::ai::build_generator;
use solace::sentiment::UnavailableClassifier;
use solace::{Config, Database, SuggestionEngine};
use std::sync::Arc;

fn main() -> solace::AppResult<()> {
    let config = Config::load()?;
    config.validate()?;

    let db = Arc::new(Database::open(&config.db_path)?);
    db.initialize_schema()?;

    let engine = SuggestionEngine::new(
        db,
        Arc::new(UnavailableClassifier::new("no model")),
        build_generator(&config)?,
    );
    for record in engine.generate_suggestions("me", None, None) {
        println!("{}: {}", record.category, record.suggestion);
    }
    Ok(())
}
```
*/

/// Text generation backends, prompts and suggestion parsing
pub mod ai;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Constants used throughout the application
pub mod constants;
/// SQLite storage
pub mod db;
/// Suggestion, insight and chat orchestration
pub mod engine;
/// Error types and utilities for error handling
pub mod errors;
/// ONNX model artifact loading
pub mod inference;
/// Signal and suggestion types
pub mod models;
/// Mood statistics and wellness goals
pub mod ops;
/// Sentiment classification and aggregation
pub mod sentiment;
/// Storage interface read by the engine
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use db::Database;
pub use engine::SuggestionEngine;
pub use errors::{AppError, AppResult};
pub use store::WellnessStore;
