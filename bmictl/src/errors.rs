use crate::api::validation::{FieldError, ValidationErrors};
use crate::db::errors::DbError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use utoipa::ToSchema;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request body failed validation; carries every offending field
    #[error("Invalid data: {0}")]
    Validation(ValidationErrors),

    /// Malformed request outside the body, e.g. a bad path segment
    #[error("{message}")]
    BadRequest { message: String },

    /// Record store failure while performing `operation`
    #[error("Failed to {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: DbError,
    },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl Error {
    /// Wrap a store error with the operation that failed, e.g. `"fetch BMI records"`
    pub fn database(operation: impl Into<String>, source: DbError) -> Self {
        Error::Database {
            operation: operation.into(),
            source,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Database { .. } | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(_) => "Invalid data".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::Database { operation, .. } => format!("Failed to {operation}"),
            Error::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.user_message(),
            details: match self {
                Error::Validation(errors) => Some(errors.0.clone()),
                _ => None,
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Database { source, .. } if source.is_constraint_violation() => {
                tracing::warn!("Database constraint error: {} ({:?})", self, source);
            }
            Error::Database { source, .. } => {
                tracing::error!("Internal service error: {} ({:?})", self, source);
            }
            Error::Internal { .. } => {
                tracing::error!("Internal service error: {}", self);
            }
            Error::Validation(_) | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_opaque() {
        let err = Error::database(
            "create BMI record",
            DbError::ForeignKeyViolation {
                constraint: Some("bmi_records_user_id_fkey".to_string()),
                table: Some("bmi_records".to_string()),
                message: "insert or update violates foreign key constraint".to_string(),
            },
        );

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body.error, "Failed to create BMI record");
        assert_eq!(body.details, None);
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let err = Error::Validation(ValidationErrors(vec![
            FieldError::new("age", "Age must be at least 1"),
            FieldError::new("heightCm", "Height is required"),
        ]));

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], "Invalid data");
        assert_eq!(body["details"][0]["field"], "age");
        assert_eq!(body["details"][1]["field"], "heightCm");
    }

    #[test]
    fn test_bad_request_has_no_details_key() {
        let err = Error::BadRequest {
            message: "Invalid user ID".to_string(),
        };
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Invalid user ID" }));
    }

    #[test]
    fn test_internal_errors_hide_their_operation() {
        let err = Error::Internal {
            operation: "hash password: bad params".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
    }
}
