//! Response rendering and error mapping.
//!
//! # Responsibilities
//! - Choose plain text or JSON from the `Accept` header
//! - Map repository and codec errors to HTTP status codes
//!
//! # Design Decisions
//! - Plain text is the default representation
//! - Validation rejections are 403, unknown subjects 404, bad input 400

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::codec::CodecError;
use crate::repository::RepositoryError;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Representation requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    Json,
}

impl Format {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_json = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains(APPLICATION_JSON));
        if wants_json {
            Format::Json
        } else {
            Format::Plain
        }
    }

    /// Build a 200 response, rendering the body only for the chosen format.
    pub fn respond(
        self,
        plain: impl FnOnce() -> String,
        json: impl FnOnce() -> String,
    ) -> Response {
        match self {
            Format::Plain => text(StatusCode::OK, plain()),
            Format::Json => ([(header::CONTENT_TYPE, APPLICATION_JSON)], json()).into_response(),
        }
    }
}

pub fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body.into()).into_response()
}

/// Error type returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let status = match &err {
            RepositoryError::SubjectNotFound(_) => StatusCode::NOT_FOUND,
            RepositoryError::InvalidSubjectName(_) => StatusCode::BAD_REQUEST,
            RepositoryError::Validation { .. } => StatusCode::FORBIDDEN,
            RepositoryError::Validator(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "Request rejected");
        }
        text(self.status, self.message)
    }
}

pub type ApiResult<T = Response> = Result<T, ApiError>;
