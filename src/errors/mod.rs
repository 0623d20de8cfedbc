//! Error handling utilities for the solace application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur inside the engine and its adapters,
//! as well as the convenience type alias `AppResult` for functions that can return
//! these errors.
//!
//! Most of these errors never reach the end user: the suggestion engine converts
//! them into fallback text or empty results at its boundary. They exist so the
//! inner layers can use `?` and so the boundary can log a precise reason.

use thiserror::Error;

/// Represents specific error cases that can occur while talking to a text
/// generation backend or the local inference runtime.
///
/// # Examples
///
/// ```
/// use solace::errors::AIError;
///
/// let error = AIError::ModelNotFound("gpt-3.5-turbo".to_string());
/// assert!(format!("{}", error).contains("gpt-3.5-turbo"));
/// ```
#[derive(Debug, Error)]
pub enum AIError {
    /// No API key is configured for the remote backend.
    #[error("No API key configured for the remote generation backend. Set OPENAI_API_KEY.")]
    MissingCredential,

    /// The remote API could not be reached (connection refused, DNS, timeout).
    #[error("Remote generation API unreachable: {0}")]
    RemoteUnreachable(#[source] reqwest::Error),

    /// The remote API does not know the requested model.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Invalid or unexpected response from the backend.
    #[error("Invalid response from generation backend: {0}")]
    InvalidResponse(String),

    /// The backend answered successfully but produced no text.
    #[error("Generation backend returned an empty completion")]
    EmptyCompletion,

    /// Local model artifacts are missing or failed to load.
    #[error("Local model unavailable: {0}")]
    ModelUnavailable(String),

    /// Local inference failed after the model was loaded.
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use solace::errors::DatabaseError;
///
/// let error = DatabaseError::NotFound("Suggestion with id 123".to_string());
/// assert!(format!("{}", error).contains("not found"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other solace instances.")]
    Pool(#[from] r2d2::Error),

    /// Requested row not found in database.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Custom database error with detailed message.
    #[error("Database error: {0}")]
    Custom(String),
}

/// Represents all possible errors that can occur in the solace application.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use solace::errors::AppError;
///
/// let error = AppError::Config("Invalid backend".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Invalid backend");
/// ```
///
/// Converting from an IO error:
/// ```
/// use solace::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied input that cannot be processed (empty message, unknown mood).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The sentiment classifier could not score a text.
    #[error("Sentiment classification error: {0}")]
    Sentiment(String),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors related to text generation.
    #[error("AI error: {0}")]
    AI(#[from] AIError),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use solace::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Validation("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Database(DatabaseError::Sqlite(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let app_io_error = AppError::Io(io_error);
        assert_eq!(format!("{}", app_io_error), "I/O error: permission denied");

        let validation = AppError::Validation("Message cannot be empty".to_string());
        assert_eq!(
            format!("{}", validation),
            "Invalid input: Message cannot be empty"
        );

        let ai_error = AppError::AI(AIError::EmptyCompletion);
        assert!(format!("{}", ai_error).contains("AI error"));
        assert!(format!("{}", ai_error).contains("empty completion"));
    }

    #[test]
    fn test_ai_error_variants() {
        let error = AIError::MissingCredential;
        assert!(format!("{}", error).contains("OPENAI_API_KEY"));

        let error = AIError::ModelUnavailable("tokenizer.json missing".to_string());
        assert!(format!("{}", error).contains("tokenizer.json missing"));

        let error = AIError::InvalidResponse("HTTP 500".to_string());
        assert!(format!("{}", error).contains("HTTP 500"));
    }

    #[test]
    fn test_database_error_conversion_to_app_error() {
        let db_error = DatabaseError::NotFound("Suggestion 7".to_string());

        let app_error: AppError = db_error.into();

        match app_error {
            AppError::Database(DatabaseError::NotFound(what)) => {
                assert_eq!(what, "Suggestion 7");
            }
            _ => panic!("Expected AppError::Database(NotFound) variant"),
        }
    }

    #[test]
    fn test_rusqlite_error_converts_through_database_error() {
        let app_error: AppError = rusqlite::Error::QueryReturnedNoRows.into();

        assert!(matches!(
            app_error,
            AppError::Database(DatabaseError::Sqlite(_))
        ));
        let source = app_error
            .source()
            .expect("AppError::Database should have a source");
        assert!(source.downcast_ref::<DatabaseError>().is_some());
    }

    #[test]
    fn test_result_combinators() {
        let io_result: Result<(), io::Error> = Err(io::Error::other("test error"));
        let app_result: AppResult<()> = io_result.map_err(AppError::Io);

        match app_result {
            Err(AppError::Io(inner)) => {
                assert_eq!(inner.kind(), io::ErrorKind::Other);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }
}
