//! In-memory implementation of the broker store.
//!
//! # Purpose
//! Implements the [`Store`] trait entirely in memory using maps guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no database file on disk)
//! - exercising hub/processor behavior deterministically
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart, including the
//!   pending delivery queue.
//! - **Single-process consistency**: write locks serialize mutations, read
//!   locks allow concurrent reads.
//!
//! # Joins
//! The authoritative queue rows hold only `(id, message_id, token, status)`.
//! Pending reads resolve payload/topic from the message log and provider
//! from the subscription map, the same join the SQLite backend performs.
//! A subscription removed after enqueue resolves to an empty provider,
//! which the queue processor skips.
use super::{Store, StoreError, StoreResult};
use crate::model::{Message, QueueItem, QueueStatus, Role, Subscription, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only log with monotonically increasing ids starting at 1.
///
/// Message ids and queue ids come from two independent instances of this
/// structure, matching the two AUTOINCREMENT columns of the durable backend.
#[derive(Debug)]
struct Sequenced<T> {
    next_id: i64,
    items: Vec<T>,
}

impl<T> Default for Sequenced<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T> Sequenced<T> {
    fn assign(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Authoritative queue row; payload/topic/provider are joined at read time.
#[derive(Debug, Clone)]
struct QueueRow {
    id: i64,
    message_id: i64,
    token: String,
    status: QueueStatus,
}

/// In-memory broker store.
///
/// All maps are wrapped in `Arc<RwLock<...>>` so the store can be cloned and
/// shared across request handlers and the queue processor. `BTreeMap`/
/// `BTreeSet` keep listing and fan-out iteration order deterministic, which
/// the tests rely on.
#[derive(Default)]
pub struct InMemoryStore {
    topics: Arc<RwLock<BTreeSet<String>>>,
    /// Subscriptions keyed by `(topic, token)`; the uniqueness invariant is
    /// the map key itself.
    subscriptions: Arc<RwLock<BTreeMap<(String, String), Subscription>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
    messages: Arc<RwLock<Sequenced<Message>>>,
    queue: Arc<RwLock<Sequenced<QueueRow>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join one queue row against messages and subscriptions.
    fn resolve(
        row: &QueueRow,
        messages: &Sequenced<Message>,
        subscriptions: &BTreeMap<(String, String), Subscription>,
    ) -> Option<QueueItem> {
        let message = messages.items.iter().find(|m| m.id == row.message_id)?;
        let provider = subscriptions
            .get(&(message.topic.clone(), row.token.clone()))
            .map(|sub| sub.provider.clone())
            .unwrap_or_default();
        Some(QueueItem {
            id: row.id,
            message_id: row.message_id,
            topic: message.topic.clone(),
            token: row.token.clone(),
            provider,
            status: row.status,
            payload: message.payload.clone(),
        })
    }

    async fn pending_where<F>(&self, keep: F) -> StoreResult<Vec<QueueItem>>
    where
        F: Fn(&QueueItem) -> bool,
    {
        // Lock order is messages then queue then subscriptions, everywhere
        // both are held at once.
        let messages = self.messages.read().await;
        let queue = self.queue.read().await;
        let subscriptions = self.subscriptions.read().await;
        let mut items: Vec<QueueItem> = queue
            .items
            .iter()
            .filter(|row| row.status == QueueStatus::Pending)
            .filter_map(|row| Self::resolve(row, &messages, &subscriptions))
            .filter(|item| keep(item))
            .collect();
        // Oldest source message first, then enqueue order, matching the
        // durable backend's sort keys.
        items.sort_by_key(|item| (item.message_id, item.id));
        Ok(items)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_topic(&self, name: &str) -> StoreResult<()> {
        let mut topics = self.topics.write().await;
        if !topics.insert(name.to_string()) {
            return Err(StoreError::AlreadyExists(format!("topic {name}")));
        }
        Ok(())
    }

    async fn delete_topic(&self, name: &str) -> StoreResult<()> {
        let mut topics = self.topics.write().await;
        if !topics.contains(name) {
            return Err(StoreError::NotFound(format!("topic {name}")));
        }
        let message_count = {
            let messages = self.messages.read().await;
            messages.items.iter().filter(|m| m.topic == name).count()
        };
        let subscriber_count = {
            let subscriptions = self.subscriptions.read().await;
            subscriptions
                .keys()
                .filter(|(topic, _)| topic.as_str() == name)
                .count()
        };
        if message_count > 0 || subscriber_count > 0 {
            return Err(StoreError::Conflict(format!(
                "cannot delete topic {name}: has {message_count} messages and {subscriber_count} subscribers"
            )));
        }
        topics.remove(name);
        Ok(())
    }

    async fn topic_exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.topics.read().await.contains(name))
    }

    async fn list_topics(&self) -> StoreResult<Vec<String>> {
        Ok(self.topics.read().await.iter().cloned().collect())
    }

    async fn add_subscription(&self, sub: &Subscription) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        let key = (sub.topic.clone(), sub.token.clone());
        // Re-subscribing the same endpoint is an idempotent success; the
        // original row wins so ownership does not silently change hands.
        subscriptions.entry(key).or_insert_with(|| sub.clone());
        metrics::gauge!("nospam_subscriptions_total").set(subscriptions.len() as f64);
        Ok(())
    }

    async fn remove_subscription(&self, topic: &str, token: &str) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(&(topic.to_string(), token.to_string()));
        metrics::gauge!("nospam_subscriptions_total").set(subscriptions.len() as f64);
        Ok(())
    }

    async fn clear_topic_subscribers(&self, topic: &str) -> StoreResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.retain(|(t, _), _| t.as_str() != topic);
        metrics::gauge!("nospam_subscriptions_total").set(subscriptions.len() as f64);
        Ok(())
    }

    async fn get_subscribers(&self, topic: &str) -> StoreResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|sub| sub.topic == topic)
            .cloned()
            .collect())
    }

    async fn get_subscriptions_by_token(&self, token: &str) -> StoreResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|sub| sub.token == token)
            .cloned()
            .collect())
    }

    async fn get_subscriptions_by_user(&self, username: &str) -> StoreResult<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .read()
            .await
            .values()
            .filter(|sub| sub.username == username)
            .cloned()
            .collect())
    }

    async fn subscription_count(&self) -> StoreResult<i64> {
        Ok(self.subscriptions.read().await.len() as i64)
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::AlreadyExists(format!("user {}", user.username)));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn delete_user(&self, username: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.remove(username).is_none() {
            return Err(StoreError::NotFound(format!("user {username}")));
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user_role(&self, username: &str, role: Role) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(username)
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))?;
        user.role = role;
        Ok(())
    }

    async fn has_admin_user(&self) -> StoreResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| user.role == Role::Admin))
    }

    async fn save_message(&self, topic: &str, payload: &[u8]) -> StoreResult<i64> {
        let mut messages = self.messages.write().await;
        let id = messages.assign();
        messages.items.push(Message {
            id,
            topic: topic.to_string(),
            payload: payload.to_vec(),
            created_at: Utc::now(),
        });
        metrics::counter!("nospam_messages_saved_total").increment(1);
        Ok(id)
    }

    async fn get_recent_messages(&self, topic: &str, limit: i64) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().await;
        let matching: Vec<&Message> = messages
            .items
            .iter()
            .filter(|m| m.topic == topic)
            .collect();
        // The log is already in id (and therefore chronological) order, so
        // the window is simply the tail.
        let skip = matching.len().saturating_sub(limit.max(0) as usize);
        Ok(matching.into_iter().skip(skip).cloned().collect())
    }

    async fn clear_topic_messages(&self, topic: &str) -> StoreResult<()> {
        // Both write locks are held for the whole operation so no reader can
        // observe a queue item whose message is gone. Lock order matches
        // the pending reads: messages then queue.
        let mut messages = self.messages.write().await;
        let mut queue = self.queue.write().await;
        let doomed: BTreeSet<i64> = messages
            .items
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.id)
            .collect();
        queue.items.retain(|row| !doomed.contains(&row.message_id));
        messages.items.retain(|m| m.topic != topic);
        Ok(())
    }

    async fn total_messages(&self) -> StoreResult<i64> {
        Ok(self.messages.read().await.items.len() as i64)
    }

    async fn enqueue_message(&self, message_id: i64, token: &str) -> StoreResult<i64> {
        // A queue item must reference a message that exists.
        {
            let messages = self.messages.read().await;
            if !messages.items.iter().any(|m| m.id == message_id) {
                return Err(StoreError::NotFound(format!("message {message_id}")));
            }
        }
        let mut queue = self.queue.write().await;
        let id = queue.assign();
        queue.items.push(QueueRow {
            id,
            message_id,
            token: token.to_string(),
            status: QueueStatus::Pending,
        });
        Ok(id)
    }

    async fn get_all_pending(&self) -> StoreResult<Vec<QueueItem>> {
        self.pending_where(|_| true).await
    }

    async fn get_pending_by_topic(&self, topic: &str) -> StoreResult<Vec<QueueItem>> {
        self.pending_where(|item| item.topic == topic).await
    }

    async fn get_pending_by_token(&self, token: &str) -> StoreResult<Vec<QueueItem>> {
        self.pending_where(|item| item.token == token).await
    }

    async fn mark_delivered(&self, queue_id: i64) -> StoreResult<()> {
        let mut queue = self.queue.write().await;
        if let Some(row) = queue.items.iter_mut().find(|row| row.id == queue_id) {
            row.status = QueueStatus::Delivered;
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
