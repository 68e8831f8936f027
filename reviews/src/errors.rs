use crate::config::ValidationError as ConfigValidationError;
use crate::query::QueryError;
use crate::seed::SeedError;
use crate::sentiment::ScorerError;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Response, StatusCode};
use shared::http::make_error_response;
use thiserror::Error;

/// Result type alias for review service operations
pub type Result<T, E = ReviewsError> = std::result::Result<T, E>;

/// Reasons a review submission is rejected. The display text is the response body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing location")]
    MissingLocation,

    #[error("missing review body")]
    MissingReviewBody,

    #[error("invalid location")]
    InvalidLocation,
}

impl ValidationError {
    /// Short tag used when recording rejections.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingLocation => "missing_location",
            ValidationError::MissingReviewBody => "missing_review_body",
            ValidationError::InvalidLocation => "invalid_location",
        }
    }
}

/// Errors that can occur while serving reviews
#[derive(Error, Debug)]
pub enum ReviewsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    MalformedQuery(#[from] QueryError),

    #[error(transparent)]
    Scorer(#[from] ScorerError),

    #[error("method not allowed")]
    MethodNotAllowed(hyper::Method),

    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Response serialization error: {0}")]
    ResponseSerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewsError::Validation(_)
            | ReviewsError::MalformedQuery(_)
            | ReviewsError::RequestBodyError(_) => StatusCode::BAD_REQUEST,
            ReviewsError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text response for this error. Server-side failures only expose
    /// the status reason, never the underlying error.
    pub fn into_response(self) -> Response<Bytes> {
        let status = self.status_code();
        let mut response = if status.is_server_error() {
            make_error_response(status)
        } else {
            let mut response = Response::new(Bytes::from(self.to_string()));
            *response.status_mut() = status;
            response
        };

        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, POST"));
        }
        response
    }
}
