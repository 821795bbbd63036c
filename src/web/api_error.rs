// One error type for every handler. Domain errors convert into it with `?`,
// and it renders as `{"error": "..."}` with the matching status code.

use crate::core::approval::ApprovalError;
use crate::core::contacts::ContactError;
use crate::core::investments::InvestmentError;
use crate::core::saved_startups::SavedStartupError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// The message is shown to the client as is; log the cause before
    /// building one.
    Internal(&'static str),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Conflict(m) => m,
            ApiError::Internal(m) => m.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    tracing::error!("Request failed: {}", err);
    ApiError::Internal("Internal server error")
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::InvalidInput(m) => ApiError::BadRequest(m),
            e @ ApprovalError::StorageError(_) => internal(e),
        }
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::InvalidInput(m) => ApiError::BadRequest(m),
            e @ (ContactError::UserNotFound | ContactError::NotFound) => {
                ApiError::NotFound(e.to_string())
            }
            e @ ContactError::AlreadyExists => ApiError::Conflict(e.to_string()),
            e @ ContactError::StorageError(_) => internal(e),
        }
    }
}

impl From<SavedStartupError> for ApiError {
    fn from(err: SavedStartupError) -> Self {
        internal(err)
    }
}

impl From<InvestmentError> for ApiError {
    fn from(err: InvestmentError) -> Self {
        match err {
            e @ InvestmentError::StartupNotFound => ApiError::NotFound(e.to_string()),
            e @ InvestmentError::StorageError(_) => internal(e),
            e => ApiError::BadRequest(e.to_string()),
        }
    }
}
