/// Error types for Post Service
///
/// Every failure the engine can produce is a distinct variant so callers can
/// branch on the kind instead of inspecting messages. Errors are converted to
/// JSON HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// A client-supplied identifier is not in the storage id format
    #[error("Invalid {field}: '{value}' is not a valid identifier")]
    InvalidIdentifier { field: &'static str, value: String },

    /// Well-formed identifier, but nothing matches it
    #[error("Not found: {0}")]
    NotFound(String),

    /// The principal does not own the targeted resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing or empty required field
    #[error("Validation error: {0}")]
    ValidationFailed(String),

    /// Request body exceeds the configured limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The image upload collaborator failed
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// No principal attached to the request
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind, included in every error body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidIdentifier { .. } => "invalid_identifier",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::ValidationFailed(_) => "validation_failed",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::UpstreamFailure(_) => "upstream_failure",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Database(_) => "database_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier { .. } | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Storage details stay in the logs
        let error_msg = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database operation failed");
                "Database error".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!(error = %e, "post document serialization failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "code": self.code(),
            "status": status.as_u16(),
        }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        AppError::ValidationFailed(format!("invalid fields: {}", fields.join(", ")))
    }
}
