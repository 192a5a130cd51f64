use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::validation::ValidationErrors;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Database-related errors.
    DatabaseError(sqlx::Error),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Field-level validation failures, caught before any store call.
    Validation(ValidationErrors),
    /// A destructive action was requested without explicit confirmation.
    ConfirmationRequired(String),
    /// Error reported by the remote lead store.
    StoreError(String),
    /// The scoring strategy failed or produced an unusable score.
    ScoringError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// The underlying human-readable message, without category prefix.
    ///
    /// This is what gets surfaced verbatim in failure notifications.
    pub fn message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => e.to_string(),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::ConfirmationRequired(msg)
            | AppError::StoreError(msg)
            | AppError::ScoringError(msg)
            | AppError::InternalError(msg) => msg.clone(),
            AppError::Validation(errors) => errors.to_string(),
            AppError::WithContext { source, .. } => source.message(),
        }
    }

    /// Returns the validation errors if this is (or wraps) a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            AppError::WithContext { source, .. } => source.validation_errors(),
            _ => None,
        }
    }

    /// Whether the error was raised before reaching the store.
    pub fn is_validation(&self) -> bool {
        self.validation_errors().is_some()
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::ConfirmationRequired(msg) => write!(f, "Confirmation required: {}", msg),
            AppError::StoreError(msg) => write!(f, "Store error: {}", msg),
            AppError::ScoringError(msg) => write!(f, "Scoring error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Store messages are passed through verbatim so the dashboard can show them.
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "fields": errors.fields,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::ConfirmationRequired(msg) => (StatusCode::PRECONDITION_REQUIRED, msg),
            AppError::StoreError(msg) => {
                tracing::error!("Store error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::ScoringError(msg) => {
                tracing::error!("Scoring error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    /// Converts a `sqlx::Error` into an `AppError`.
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::StoreError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    /// Malformed bodies and wrong content types become a JSON 400.
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

/// Extension for sqlx::Error to add context
impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: f(),
        })
    }
}
