//! Persistence contract for the broker.
//!
//! # Purpose
//! Defines the [`Store`] trait that the hub, the queue processor, and the
//! API layer program against, plus the error type shared by all backends.
//!
//! Two implementations exist:
//! - [`sqlite::SqliteStore`]: durable, embedded file database (production)
//! - [`memory::InMemoryStore`]: process-local maps (dev and tests)
//!
//! # Consistency requirements on implementors
//! - Every mutating operation is atomic against concurrent callers; no
//!   half-written message or queue rows may be observable.
//! - `clear_topic_messages` removes queue items belonging to the topic's
//!   messages before (or atomically with) the messages themselves, so a
//!   queue item always references a message that exists.
//! - Message ids and queue ids are monotonically increasing, independently
//!   of each other.
//! - `mark_delivered` is idempotent: marking an already-delivered item is a
//!   no-op, never an error.
use crate::model::{Message, QueueItem, Role, Subscription, User};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // -----------------------------
    // Topics
    // -----------------------------

    /// Unique-name insert; fails with [`StoreError::AlreadyExists`] when the
    /// topic is present.
    async fn create_topic(&self, name: &str) -> StoreResult<()>;

    /// Removes an empty topic. Fails with [`StoreError::Conflict`] while any
    /// message or subscription still references it, naming the non-zero
    /// counts, and with [`StoreError::NotFound`] for an unknown topic.
    async fn delete_topic(&self, name: &str) -> StoreResult<()>;

    async fn topic_exists(&self, name: &str) -> StoreResult<bool>;
    async fn list_topics(&self) -> StoreResult<Vec<String>>;

    // -----------------------------
    // Subscriptions
    // -----------------------------

    /// Insert keyed on `(topic, token)`. Re-invocation with an existing key
    /// is an idempotent success, not a conflict.
    async fn add_subscription(&self, sub: &Subscription) -> StoreResult<()>;
    async fn remove_subscription(&self, topic: &str, token: &str) -> StoreResult<()>;
    async fn clear_topic_subscribers(&self, topic: &str) -> StoreResult<()>;
    async fn get_subscribers(&self, topic: &str) -> StoreResult<Vec<Subscription>>;
    async fn get_subscriptions_by_token(&self, token: &str) -> StoreResult<Vec<Subscription>>;
    async fn get_subscriptions_by_user(&self, username: &str) -> StoreResult<Vec<Subscription>>;
    async fn subscription_count(&self) -> StoreResult<i64>;

    // -----------------------------
    // Users
    // -----------------------------

    async fn create_user(&self, user: &User) -> StoreResult<()>;
    async fn get_user(&self, username: &str) -> StoreResult<Option<User>>;
    /// Fails with [`StoreError::NotFound`] for an unknown username.
    async fn delete_user(&self, username: &str) -> StoreResult<()>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user_role(&self, username: &str, role: Role) -> StoreResult<()>;
    async fn has_admin_user(&self) -> StoreResult<bool>;

    // -----------------------------
    // Messages
    // -----------------------------

    /// Assigns a fresh id, records `created_at = now()`, and returns the id.
    async fn save_message(&self, topic: &str, payload: &[u8]) -> StoreResult<i64>;

    /// Returns the last `limit` messages of the topic in chronological order
    /// (oldest first), ready for replay delivery.
    async fn get_recent_messages(&self, topic: &str, limit: i64) -> StoreResult<Vec<Message>>;

    /// Atomically deletes the topic's queue items and then its messages.
    async fn clear_topic_messages(&self, topic: &str) -> StoreResult<()>;

    /// Count of persisted messages; a persisted message counts as a sent
    /// broadcast for stats purposes.
    async fn total_messages(&self) -> StoreResult<i64>;

    // -----------------------------
    // Delivery queue
    // -----------------------------

    /// Pending insert for `(message_id, token)`; returns the queue id.
    async fn enqueue_message(&self, message_id: i64, token: &str) -> StoreResult<i64>;

    /// All pending items, oldest source-message first, with payload and
    /// provider resolved from the message and subscription tables.
    async fn get_all_pending(&self) -> StoreResult<Vec<QueueItem>>;

    async fn get_pending_by_topic(&self, topic: &str) -> StoreResult<Vec<QueueItem>>;
    async fn get_pending_by_token(&self, token: &str) -> StoreResult<Vec<QueueItem>>;

    /// Transition pending -> delivered. Idempotent no-op when already
    /// delivered.
    async fn mark_delivered(&self, queue_id: i64) -> StoreResult<()>;

    // -----------------------------
    // Health and identity
    // -----------------------------

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
