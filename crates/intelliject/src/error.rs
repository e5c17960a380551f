//! Error types for IntelliJect

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for IntelliJect operations
pub type Result<T> = std::result::Result<T, Error>;

/// IntelliJect errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad request data (wrong file type, missing form field, ...)
    #[error("{0}")]
    InvalidInput(String),

    /// The uploaded PDF produced no text chunks
    #[error("Could not extract content from the PDF")]
    NoContent,

    /// PDF parsing error
    #[error("Failed to parse PDF: {0}")]
    PdfParse(String),

    /// Page rendering error
    #[error("Failed to render page: {0}")]
    Render(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) | Error::NoContent | Error::PdfParse(_) | Error::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Llm(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_)
            | Error::Render(_)
            | Error::Embedding(_)
            | Error::Storage(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::PdfParse(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::InvalidInput(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(format!("Task join error: {}", err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        // The browser client reads `detail`
        let body = Json(json!({ "detail": self.to_string() }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NoContent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::invalid_input("Only PDF files are allowed").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::llm("down").status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            Error::Storage("locked".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_has_detail() {
        let response = Error::invalid_input("Only PDF files are allowed").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["detail"], "Only PDF files are allowed");
    }

    #[test]
    fn test_no_content_message() {
        assert_eq!(
            Error::NoContent.to_string(),
            "Could not extract content from the PDF"
        );
    }
}
