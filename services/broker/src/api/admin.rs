//! Admin endpoints: topic CRUD and inspection, user management, token
//! minting on behalf of users.
use crate::api::authorize;
use crate::api::error::{
    api_bad_request, api_conflict, api_internal, api_not_found, from_hub_error, ApiError,
};
use crate::api::types::{
    CreateTopicRequest, CreateUserRequest, CreateUserResponse, ErrorBody, MessageView,
    QueueItemView, StatusMessage, TokenInfoResponse, UserResponse,
};
use crate::app::AppState;
use crate::auth;
use crate::hub::HubError;
use crate::model::{Role, Subscription, User};
use crate::store::StoreError;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::collections::HashMap;

/// Cap on messages returned by the inspection endpoint.
const MESSAGE_INSPECT_LIMIT: i64 = 100;

#[utoipa::path(
    get,
    path = "/admin/topics",
    tag = "admin",
    responses(
        (status = 200, description = "All topic names", body = [String])
    )
)]
pub async fn list_topics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let topics = state
        .hub
        .list_topics()
        .await
        .map_err(|err| from_hub_error(err, "Failed to list topics"))?;
    Ok(Json(topics))
}

#[utoipa::path(
    post,
    path = "/admin/topics",
    tag = "admin",
    request_body = CreateTopicRequest,
    responses(
        (status = 201, description = "Topic created", body = StatusMessage),
        (status = 409, description = "Topic already exists", body = ErrorBody)
    )
)]
pub async fn create_topic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    if body.name.is_empty() {
        return Err(api_bad_request("Missing topic name"));
    }
    match state.hub.create_topic(&body.name).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(StatusMessage::new("Topic created")))),
        Err(HubError::Store(StoreError::AlreadyExists(_))) => {
            Err(api_conflict("Topic already exists"))
        }
        Err(err) => Err(from_hub_error(err, "Failed to create topic")),
    }
}

/// Delete an empty topic. Conflicts (messages or subscribers still attached)
/// surface the store's descriptive text so operators see the counts.
#[utoipa::path(
    delete,
    path = "/admin/topics/{name}",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Topic deleted", body = StatusMessage),
        (status = 404, description = "Topic not found", body = ErrorBody),
        (status = 409, description = "Topic still referenced", body = ErrorBody)
    )
)]
pub async fn delete_topic(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    state
        .hub
        .delete_topic(&name)
        .await
        .map_err(|err| from_hub_error(err, "Failed to delete topic"))?;
    Ok(Json(StatusMessage::new("Topic deleted")))
}

#[utoipa::path(
    get,
    path = "/admin/topics/{name}/messages",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Recent messages, oldest first", body = [MessageView])
    )
)]
pub async fn topic_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let messages = state
        .hub
        .get_recent_messages(&name, MESSAGE_INSPECT_LIMIT)
        .await
        .map_err(|err| from_hub_error(err, "Failed to get messages"))?;
    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/admin/topics/{name}/messages",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Messages cleared", body = StatusMessage)
    )
)]
pub async fn clear_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    state
        .hub
        .clear_topic_messages(&name)
        .await
        .map_err(|err| from_hub_error(err, "Failed to clear messages"))?;
    Ok(Json(StatusMessage::new("Messages cleared")))
}

#[utoipa::path(
    get,
    path = "/admin/topics/{name}/subscribers",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Current subscribers", body = [Subscription])
    )
)]
pub async fn topic_subscribers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let subs = state
        .hub
        .get_subscribers(&name)
        .await
        .map_err(|err| from_hub_error(err, "Failed to get subscribers"))?;
    Ok(Json(subs))
}

#[utoipa::path(
    delete,
    path = "/admin/topics/{name}/subscribers",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Subscribers cleared", body = StatusMessage)
    )
)]
pub async fn clear_subscribers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    state
        .hub
        .clear_topic_subscribers(&name)
        .await
        .map_err(|err| from_hub_error(err, "Failed to clear subscribers"))?;
    Ok(Json(StatusMessage::new("Subscribers cleared")))
}

#[utoipa::path(
    get,
    path = "/admin/topics/{name}/queue",
    tag = "admin",
    params(("name" = String, Path, description = "Topic name")),
    responses(
        (status = 200, description = "Pending queue items", body = [QueueItemView]),
        (status = 404, description = "Topic not found", body = ErrorBody)
    )
)]
pub async fn topic_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Vec<QueueItemView>>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let items = state
        .hub
        .get_queue(&name)
        .await
        .map_err(|err| from_hub_error(err, "Failed to get queue"))?;
    Ok(Json(items.into_iter().map(QueueItemView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users", body = [UserResponse])
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let users = state
        .store
        .list_users()
        .await
        .map_err(|_| api_internal("Failed to list users"))?;
    Ok(Json(
        users
            .into_iter()
            .map(|user| UserResponse {
                username: user.username,
                role: user.role,
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid role", body = ErrorBody),
        (status = 409, description = "User already exists", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    if body.username.is_empty() || body.password.is_empty() {
        return Err(api_bad_request("Username and password are required"));
    }
    let role = match body.role.as_deref() {
        None | Some("") => Role::Subscriber,
        Some(name) => Role::parse(name).ok_or_else(|| {
            api_bad_request("Invalid role. Must be admin, publisher, or subscriber")
        })?,
    };

    let password_hash = auth::hash_password(&body.password)
        .map_err(|_| api_internal("Failed to hash password"))?;
    let user = User {
        username: body.username.clone(),
        password_hash,
        role,
    };
    match state.store.create_user(&user).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(CreateUserResponse {
                message: "User created".to_string(),
                username: body.username,
                role,
            }),
        )),
        Err(StoreError::AlreadyExists(_)) => Err(api_conflict("User already exists")),
        Err(err) => {
            tracing::error!(error = %err, "failed to create user");
            Err(api_internal("Failed to create user"))
        }
    }
}

/// Delete a user. Deleting the calling account is rejected so an admin
/// cannot lock themselves out mid-session.
#[utoipa::path(
    delete,
    path = "/admin/users/{username}",
    tag = "admin",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User deleted", body = StatusMessage),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Cannot delete yourself", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    let claims = authorize(&state, &headers, Role::Admin)?;
    if claims.sub == username {
        return Err(api_conflict("Cannot delete yourself"));
    }
    match state.store.delete_user(&username).await {
        Ok(()) => Ok(Json(StatusMessage::new("User deleted"))),
        Err(StoreError::NotFound(_)) => Err(api_not_found("User not found")),
        Err(err) => {
            tracing::error!(error = %err, "failed to delete user");
            Err(api_internal("Failed to delete user"))
        }
    }
}

/// Mint a token for an existing user with their stored role; used to hand
/// out credentials without knowing the user's password.
#[utoipa::path(
    get,
    path = "/admin/token",
    tag = "admin",
    params(("username" = String, Query, description = "Username to mint for")),
    responses(
        (status = 200, description = "Token minted", body = TokenInfoResponse),
        (status = 400, description = "Missing username parameter", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn mint_user_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TokenInfoResponse>, ApiError> {
    authorize(&state, &headers, Role::Admin)?;
    let username = params
        .get("username")
        .filter(|username| !username.is_empty())
        .ok_or_else(|| api_bad_request("username parameter is required"))?;

    let user = state
        .store
        .get_user(username)
        .await
        .map_err(|_| api_internal("Failed to check user"))?
        .ok_or_else(|| api_not_found("User not found"))?;

    let token = auth::mint_token(&state.jwt_secret, &user.username, user.role, auth::TOKEN_TTL)
        .map_err(|_| api_internal("Failed to generate token"))?;
    Ok(Json(TokenInfoResponse {
        token,
        role: user.role,
        username: user.username,
    }))
}
