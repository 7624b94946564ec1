//! Broker HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules plus the shared bearer-token guard
//! used across them.
//!
//! # Key invariants
//! - Every authenticated handler calls [`authorize`] before touching state.
//! - Role checks are least-privilege with one exception: admin tokens
//!   satisfy any role requirement.
//! - Error shapes are standardized via `api::error`.
pub mod admin;
pub mod auth;
pub mod error;
pub mod openapi;
pub mod pubsub;
pub mod types;

use crate::api::error::{api_forbidden, api_unauthorized, ApiError};
use crate::app::AppState;
use crate::auth::Claims;
use crate::model::Role;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Validate the `Authorization: Bearer` token and enforce the role the
/// route requires. Returns the verified claims so handlers know who is
/// calling (ownership checks, delete-self guard).
pub(crate) fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    required: Role,
) -> Result<Claims, ApiError> {
    let claims = bearer_claims(state, headers)?;
    if claims.role != required && claims.role != Role::Admin {
        return Err(api_forbidden("Insufficient role"));
    }
    Ok(claims)
}

/// Validate the bearer token without a role requirement (used by refresh).
pub(crate) fn bearer_claims(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| api_unauthorized("Authorization header missing"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| api_unauthorized("Invalid Authorization header format"))?;
    crate::auth::verify_token(&state.jwt_secret, token)
        .map_err(|_| api_unauthorized("Invalid token"))
}
