//! HTTP-facing errors
//!
//! Every failure leaves the handler as a status code and a JSON body with an
//! `error` message.

use crate::generate::GenerateError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use studykit_extract::ExtractError;
use thiserror::Error;
use tracing::error;

/// Result type for handlers and collaborators
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request
    #[error("{0}")]
    BadRequest(String),

    /// Input could not be turned into admitted text
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error("Content not found")]
    NotFound,

    /// Record exists but study materials could not be produced
    #[error("Failed to generate learning materials. Please check your OpenAI API key and try again.")]
    Generation {
        #[source]
        source: GenerateError,
        content_id: u64,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(ExtractError::ContentTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Extraction(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Generation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Generation { source, content_id } => {
                error!(content_id, error = %source, "Material generation failed");
                json!({
                    "error": self.to_string(),
                    "details": source.to_string(),
                    "contentId": content_id,
                })
            }
            AppError::Extraction(e) if e.is_security() => json!({
                "error": self.to_string(),
                "security": true,
            }),
            _ => {
                if status.is_server_error() {
                    error!(error = %self, "Request failed");
                }
                json!({ "error": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studykit_guard::ValidationFailure;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(ExtractError::CaptionsUnavailable).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ExtractError::ContentTooLarge { size: 10, max: 5 }).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(ExtractError::Other("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_pass_through() {
        let err = AppError::from(ExtractError::Validation(ValidationFailure::Empty));
        assert_eq!(err.to_string(), "Content cannot be empty");
    }
}
