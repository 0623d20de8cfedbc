//! Constants used throughout the application.
//!
//! This module contains the constants used in Solace, organized into logical
//! groups. Having constants centralized makes them easier to find, modify, and
//! reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "solace";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "Adaptive self-care suggestions from your moods, journal and chats";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// User name used when neither `--user` nor `$USER` is available.
pub const DEFAULT_USER: &str = "me";

// Configuration Keys & Environment Variables
/// Environment variable for the SQLite database path.
pub const ENV_VAR_SOLACE_DB: &str = "SOLACE_DB";
/// Environment variable selecting the generation backend (`remote`, `local`, `auto`).
pub const ENV_VAR_SOLACE_BACKEND: &str = "SOLACE_BACKEND";
/// Environment variable holding the remote API credential.
pub const ENV_VAR_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the remote API base URL.
pub const ENV_VAR_SOLACE_API_BASE: &str = "SOLACE_API_BASE";
/// Environment variable overriding the remote chat model.
pub const ENV_VAR_SOLACE_CHAT_MODEL: &str = "SOLACE_CHAT_MODEL";
/// Environment variable for the remote request timeout, in seconds.
pub const ENV_VAR_SOLACE_REQUEST_TIMEOUT: &str = "SOLACE_REQUEST_TIMEOUT";
/// Environment variable for the local generator artifact directory.
pub const ENV_VAR_SOLACE_MODEL_DIR: &str = "SOLACE_MODEL_DIR";
/// Environment variable for the sentiment classifier artifact directory.
pub const ENV_VAR_SOLACE_SENTIMENT_MODEL_DIR: &str = "SOLACE_SENTIMENT_MODEL_DIR";
/// Environment variable selecting how mood ordinals enter the sentiment pool.
pub const ENV_VAR_SOLACE_MOOD_SCALE: &str = "SOLACE_MOOD_SCALE";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Standard environment variable for the login name.
pub const ENV_VAR_USER: &str = "USER";

/// Default database location, expanded with `shellexpand`.
pub const DEFAULT_DB_PATH: &str = "~/.local/share/solace/solace.db";
/// Default local generator artifact directory.
pub const DEFAULT_MODEL_DIR: &str = "~/.local/share/solace/models/dialogpt";
/// Default sentiment classifier artifact directory.
pub const DEFAULT_SENTIMENT_MODEL_DIR: &str = "~/.local/share/solace/models/sentiment";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Remote Generation
/// Default base URL for the OpenAI-compatible chat completions API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Default remote chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
/// Default remote request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Maximum completion length requested from the remote API.
pub const REMOTE_MAX_TOKENS: u32 = 150;
/// Sampling temperature for the remote API.
pub const REMOTE_TEMPERATURE: f32 = 0.7;
/// Nucleus sampling mass for the remote API.
pub const REMOTE_TOP_P: f32 = 0.9;
/// Frequency penalty for the remote API.
pub const REMOTE_FREQUENCY_PENALTY: f32 = 0.5;
/// Presence penalty for the remote API.
pub const REMOTE_PRESENCE_PENALTY: f32 = 0.5;

// Local Generation
/// File name of the ONNX graph inside a model directory.
pub const MODEL_FILE_NAME: &str = "model.onnx";
/// File name of the HuggingFace tokenizer inside a model directory.
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";
/// Maximum number of tokens the local model may append to the prompt.
pub const LOCAL_MAX_NEW_TOKENS: usize = 100;
/// Hard cap on prompt + generated tokens for the local model.
pub const LOCAL_MAX_CONTEXT_TOKENS: usize = 1000;
/// Sampling temperature for the local model.
pub const LOCAL_TEMPERATURE: f32 = 0.7;
/// Top-k cutoff for the local model.
pub const LOCAL_TOP_K: usize = 50;
/// Nucleus sampling mass for the local model.
pub const LOCAL_TOP_P: f32 = 0.95;
/// Size of n-grams that may not repeat in local output.
pub const LOCAL_NO_REPEAT_NGRAM: usize = 3;

// Sentiment
/// Aggregate values at or below this are labelled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.3;
/// Aggregate values at or above this are labelled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.3;

// Engine Windows
/// Number of recent moods and journal entries used for suggestions.
pub const RECENT_SIGNAL_LIMIT: usize = 5;
/// Number of recent assistant chat messages used for suggestions.
pub const RECENT_CHAT_LIMIT: usize = 10;
/// Number of recent chat messages rendered as history for a chat reply.
pub const CHAT_HISTORY_LIMIT: usize = 5;
/// Number of mood samples embedded in the mood-insight prompt.
pub const INSIGHT_MOOD_LIMIT: usize = 10;
/// Characters kept from each journal or chat text inside the suggestion prompt.
pub const PROMPT_EXCERPT_CHARS: usize = 100;
/// Number of suggestions the backend is asked to produce.
pub const SUGGESTIONS_PER_REQUEST: usize = 5;

// Canned Responses
/// Returned by mood insight when there is nothing to analyse.
pub const NO_MOOD_ENTRIES_MESSAGE: &str = "No mood entries available for analysis.";
/// Returned by mood insight when generation produced nothing usable.
pub const MOOD_ENCOURAGEMENT_MESSAGE: &str = "I notice you've been tracking your moods. That's a great step towards self-awareness. Would you like to share more about how you're feeling today?";

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "solace";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
