//! Authentication endpoints: login, self-registration, token refresh.
use crate::api::error::{api_bad_request, api_conflict, api_internal, api_unauthorized, ApiError};
use crate::api::types::{ErrorBody, LoginRequest, RegisterRequest, StatusMessage, TokenResponse};
use crate::api::bearer_claims;
use crate::app::AppState;
use crate::auth;
use crate::model::{Role, User};
use crate::store::StoreError;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .store
        .get_user(&body.username)
        .await
        .map_err(|_| api_internal("Internal server error"))?
        .ok_or_else(|| api_unauthorized("Invalid credentials"))?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(api_unauthorized("Invalid credentials"));
    }

    let token = auth::mint_token(&state.jwt_secret, &user.username, user.role, auth::TOKEN_TTL)
        .map_err(|_| api_internal("Failed to generate token"))?;
    Ok(Json(TokenResponse { token }))
}

/// Public self-registration; accounts created here are always subscribers.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = StatusMessage),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 409, description = "Username taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(api_bad_request("Username and password are required"));
    }

    let password_hash = auth::hash_password(&body.password)
        .map_err(|_| api_internal("Failed to hash password"))?;
    let user = User {
        username: body.username,
        password_hash,
        role: Role::Subscriber,
    };
    match state.store.create_user(&user).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(StatusMessage::new("User registered")),
        )),
        Err(StoreError::AlreadyExists(_)) => Err(api_conflict("User already exists")),
        Err(err) => {
            tracing::error!(error = %err, "failed to register user");
            Err(api_internal("Failed to create user"))
        }
    }
}

/// Reissue a token for the authenticated caller with its current identity.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "Token reissued", body = TokenResponse),
        (status = 401, description = "Invalid token", body = ErrorBody)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = bearer_claims(&state, &headers)?;
    let token = auth::mint_token(&state.jwt_secret, &claims.sub, claims.role, auth::TOKEN_TTL)
        .map_err(|_| api_internal("Failed to refresh token"))?;
    Ok(Json(TokenResponse { token }))
}
