use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::gemini::CompletionError;
use crate::recommend::RecommendError;

impl RecommendError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecommendError::Malformed(_) | RecommendError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            RecommendError::Completion(CompletionError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            RecommendError::Completion(_) => StatusCode::BAD_GATEWAY,
            RecommendError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "bad request: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}
