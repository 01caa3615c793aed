use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bounty_review::ReviewError;
use bounty_social::VerificationError;
use serde_json::json;
use thiserror::Error;

const GENERIC_ERROR: &str = "Internal server error";

/// Every failure the HTTP layer can answer with. Renders as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(detail: impl ToString) -> Self {
        ApiError::Internal(detail.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Internal detail stays in the logs.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::RateLimited(msg) => msg,
            ApiError::Internal(_) | ApiError::Configuration(_) => GENERIC_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) | ApiError::Configuration(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Standalone social endpoints: rate limiting is surfaced as 429, platform
/// faults as 500.
impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        if err.is_rate_limited() {
            ApiError::RateLimited(err.to_string())
        } else if err.is_client_fault() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        if err.is_client_fault() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(format!("{}: {:?}", err, err))
        }
    }
}
