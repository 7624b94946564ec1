//! API error types and helpers.
//!
//! # Purpose
//! Centralizes HTTP error response construction so every endpoint returns
//! the same `{"error": "..."}` shape, and maps hub/store errors onto the
//! status-code contract (404 missing topic/user, 409 conflicts and
//! duplicates, 400 bad input, 401/403 auth, 500 storage).
use crate::api::types::ErrorBody;
use crate::hub::HubError;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn api_bad_request(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, message)
}

pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, message)
}

pub fn api_forbidden(message: &str) -> ApiError {
    ApiError::new(StatusCode::FORBIDDEN, message)
}

pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, message)
}

pub fn api_conflict(message: &str) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, message)
}

pub fn api_internal(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// Map a hub failure onto the response contract. `context` is the generic
/// 500 text used when the error is an internal storage failure.
pub fn from_hub_error(err: HubError, context: &str) -> ApiError {
    match err {
        HubError::TopicNotFound => api_not_found("Topic not found"),
        HubError::Store(store_err) => from_store_error(store_err, context),
        // Direct-send failures carry their own text; the Go-era contract
        // surfaces them as internal errors rather than inventing statuses.
        other => {
            tracing::warn!(error = %other, "request failed in hub");
            api_internal(&other.to_string())
        }
    }
}

pub fn from_store_error(err: StoreError, context: &str) -> ApiError {
    match err {
        StoreError::NotFound(message) => api_not_found(&message),
        StoreError::AlreadyExists(message) => api_conflict(&message),
        StoreError::Conflict(message) => api_conflict(&message),
        StoreError::Unexpected(inner) => {
            tracing::error!(error = ?inner, "broker storage error");
            api_internal(context)
        }
    }
}
