//! OpenAPI document assembly for the broker API.
use crate::api::types::{
    CreateTopicRequest, CreateUserRequest, CreateUserResponse, ErrorBody, LoginRequest,
    MessageView, QueueItemView, RegisterRequest, SendRequest, StatsResponse, StatusMessage,
    SubscribeRequest, TokenInfoResponse, TokenResponse, UnsubscribeRequest, UserResponse,
};
use crate::model::{QueueStatus, Role, Subscription};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "no-spam-broker",
        description = "Multi-tenant push-notification broker HTTP API"
    ),
    paths(
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::refresh,
        crate::api::pubsub::subscribe,
        crate::api::pubsub::unsubscribe,
        crate::api::pubsub::my_topics,
        crate::api::pubsub::send,
        crate::api::pubsub::stats,
        crate::api::admin::list_topics,
        crate::api::admin::create_topic,
        crate::api::admin::delete_topic,
        crate::api::admin::topic_messages,
        crate::api::admin::clear_messages,
        crate::api::admin::topic_subscribers,
        crate::api::admin::clear_subscribers,
        crate::api::admin::topic_queue,
        crate::api::admin::list_users,
        crate::api::admin::create_user,
        crate::api::admin::delete_user,
        crate::api::admin::mint_user_token
    ),
    components(schemas(
        ErrorBody,
        StatusMessage,
        LoginRequest,
        TokenResponse,
        RegisterRequest,
        SubscribeRequest,
        UnsubscribeRequest,
        SendRequest,
        StatsResponse,
        CreateTopicRequest,
        CreateUserRequest,
        CreateUserResponse,
        UserResponse,
        TokenInfoResponse,
        MessageView,
        QueueItemView,
        Subscription,
        QueueStatus,
        Role
    )),
    tags(
        (name = "auth", description = "Login, registration, token refresh"),
        (name = "pubsub", description = "Subscribe and publish operations"),
        (name = "admin", description = "Topic and user administration")
    )
)]
pub struct ApiDoc;
