//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes for the broker REST API and the OpenAPI
//! schema generation. Domain types stay out of responses where they carry
//! server-side fields (password hashes, raw payload bytes); dedicated view
//! types are used instead.
use crate::model::{Message, QueueItem, QueueStatus, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Generic `{"message": ...}` acknowledgement used by mutation endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: &str) -> Self {
        StatusMessage {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Subscribe body. `webhook` is an alias for `token` kept for webhook
/// subscribers; exactly one of the two must be present.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub topic: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub webhook: Option<String>,
    pub provider: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnsubscribeRequest {
    pub topic: String,
    pub token: String,
}

/// Documentation shape for `/send`. Handlers deserialize straight into
/// [`crate::hub::RouteRequest`] to keep the publisher payload verbatim.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_messages_sent: i64,
    pub active_subscriptions: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTopicRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenInfoResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// Admin-facing view of a persisted message. The payload is rendered as the
/// JSON it is (the broadcast envelope); bytes that fail to parse (which a
/// broadcast can never produce) degrade to `null` rather than failing the
/// listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageView {
    pub id: i64,
    pub topic: String,
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        let payload = serde_json::from_slice(&message.payload).unwrap_or(serde_json::Value::Null);
        MessageView {
            id: message.id,
            topic: message.topic,
            payload,
            created_at: message.created_at,
        }
    }
}

/// Admin-facing view of a pending queue item; the cached payload bytes stay
/// server-side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueItemView {
    pub id: i64,
    pub message_id: i64,
    pub topic: String,
    pub token: String,
    pub provider: String,
    pub status: QueueStatus,
}

impl From<QueueItem> for QueueItemView {
    fn from(item: QueueItem) -> Self {
        QueueItemView {
            id: item.id,
            message_id: item.message_id,
            topic: item.topic,
            token: item.token,
            provider: item.provider,
            status: item.status,
        }
    }
}
