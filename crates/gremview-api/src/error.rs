//! HTTP error mapping.
//!
//! Every failure is answered with a `{"error": "<message>"}` body. The
//! status code follows the failure class:
//!
//! | Failure | Status |
//! |---------|--------|
//! | missing or malformed input | 400 |
//! | wrong method | 405 |
//! | backend unreachable | 502 |
//! | primary query timed out | 504 |
//! | anything else | 500 |

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gremview_core::Error;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Errors returned by the HTTP handlers.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum ApiError {
    /// A pipeline error.
    #[error(transparent)]
    Pipeline(#[from] Error),

    /// The body could not be read as a request.
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// The route does not accept this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A failure reported as a plain server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a pipeline error so that only input errors keep their own status.
    ///
    /// Edge property lookups report every backend failure as a server error.
    pub fn flatten(error: Error) -> Self {
        if error.is_client_error() {
            Self::Pipeline(error)
        } else {
            Self::Internal(error.to_string())
        }
    }

    /// The HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(Error::InvalidInput { .. }) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Pipeline(Error::Connection { .. }) => StatusCode::BAD_GATEWAY,
            Self::Pipeline(Error::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Pipeline(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
