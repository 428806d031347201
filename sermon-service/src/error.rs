/// Error types for the sermon service.
///
/// Core operations return `Result<T, AppError>`; the actix layer maps each
/// variant to an HTTP status via `ResponseError`. Only `Internal` hides its
/// detail from the caller (it is logged instead).
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for sermon-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error taxonomy
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or malformed
    #[error("validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Series dates are not chronological
    #[error("StartDate must not be after EndDate")]
    Chronology,

    /// Slug collision or duplicate message ownership
    #[error("conflict: {0}")]
    Conflict(String),

    /// An id or slug did not resolve
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent writer won the compare-and-swap on the live record
    #[error("live record was modified concurrently, retry the operation")]
    VersionConflict,

    /// The document store timed out or failed
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected defect; detail is logged, never returned to the caller
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure for a required field that was empty or absent.
    pub fn missing(field: &str) -> Self {
        AppError::Validation {
            field: field.to_string(),
            reason: "field is required and cannot be empty".to_string(),
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Chronology => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::VersionConflict => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal detail stays in the logs.
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("a record with this slug already exists".to_string())
            }
            sqlx::Error::RowNotFound => AppError::NotFound("record does not exist".to_string()),
            _ => AppError::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("document serialization failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(AppError::missing("Name").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Chronology.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Conflict("slug".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::VersionConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::StoreUnavailable("timeout".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_error_names_the_field() {
        let err = AppError::missing("ArtUrl");
        assert!(err.to_string().contains("ArtUrl"));
    }
}
