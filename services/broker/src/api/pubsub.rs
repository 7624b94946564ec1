//! Publisher and subscriber endpoints: subscribe/unsubscribe, listing own
//! subscriptions, publishing, and stats.
use crate::api::authorize;
use crate::api::error::{api_bad_request, api_internal, from_hub_error, ApiError};
use crate::api::types::{
    ErrorBody, SendRequest, StatsResponse, StatusMessage, SubscribeRequest, UnsubscribeRequest,
};
use crate::app::AppState;
use crate::hub::RouteRequest;
use crate::model::{Role, Subscription};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

/// Register a delivery endpoint against a topic. Replays recent history to
/// the new endpoint asynchronously; the call succeeds as soon as the
/// subscription row exists.
#[utoipa::path(
    post,
    path = "/subscribe",
    tag = "pubsub",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = StatusMessage),
        (status = 400, description = "Missing token or webhook", body = ErrorBody),
        (status = 404, description = "Topic not found", body = ErrorBody)
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubscribeRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let claims = authorize(&state, &headers, Role::Subscriber)?;

    // Webhook subscribers pass their URL under `webhook`; it is the same
    // opaque endpoint token to the broker.
    let token = body
        .token
        .filter(|token| !token.is_empty())
        .or_else(|| body.webhook.filter(|webhook| !webhook.is_empty()))
        .ok_or_else(|| api_bad_request("Missing token or webhook field"))?;
    if body.topic.is_empty() || body.provider.is_empty() {
        return Err(api_bad_request("Missing required fields (topic, provider)"));
    }

    let sub = Subscription {
        topic: body.topic.clone(),
        token,
        provider: body.provider,
        username: claims.sub,
    };
    state
        .hub
        .subscribe(&body.topic, sub)
        .await
        .map_err(|err| from_hub_error(err, "Failed to subscribe"))?;
    Ok(Json(StatusMessage::new("Subscribed")))
}

#[utoipa::path(
    post,
    path = "/unsubscribe",
    tag = "pubsub",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = StatusMessage)
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UnsubscribeRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    authorize(&state, &headers, Role::Subscriber)?;
    if body.topic.is_empty() || body.token.is_empty() {
        return Err(api_bad_request("Missing required fields (topic, token)"));
    }
    state
        .hub
        .unsubscribe(&body.topic, &body.token)
        .await
        .map_err(|err| from_hub_error(err, "Failed to unsubscribe"))?;
    Ok(Json(StatusMessage::new("Unsubscribed")))
}

/// List the caller's own subscriptions.
#[utoipa::path(
    get,
    path = "/topics",
    tag = "pubsub",
    responses(
        (status = 200, description = "Own subscriptions", body = [Subscription])
    )
)]
pub async fn my_topics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    let claims = authorize(&state, &headers, Role::Subscriber)?;
    let subs = state
        .hub
        .get_subscriptions_by_user(&claims.sub)
        .await
        .map_err(|err| from_hub_error(err, "Failed to list subscriptions"))?;
    Ok(Json(subs))
}

/// Publish: broadcast to a topic, or direct send when no topic is named.
#[utoipa::path(
    post,
    path = "/send",
    tag = "pubsub",
    request_body = SendRequest,
    responses(
        (status = 200, description = "Message sent", body = StatusMessage),
        (status = 404, description = "Topic not found", body = ErrorBody)
    )
)]
pub async fn send(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(msg): Json<RouteRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    authorize(&state, &headers, Role::Publisher)?;
    state
        .hub
        .route(msg)
        .await
        .map_err(|err| from_hub_error(err, "Failed to route message"))?;
    Ok(Json(StatusMessage::new("Message sent")))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "pubsub",
    responses(
        (status = 200, description = "Broker stats", body = StatsResponse)
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    authorize(&state, &headers, Role::Publisher)?;
    let total_messages_sent = state
        .hub
        .total_messages_sent()
        .await
        .map_err(|_| api_internal("Failed to load stats"))?;
    let active_subscriptions = state
        .hub
        .subscription_count()
        .await
        .map_err(|_| api_internal("Failed to load stats"))?;
    Ok(Json(StatsResponse {
        total_messages_sent,
        active_subscriptions,
    }))
}
