//! Message routing core.
//!
//! # Purpose
//! The [`Hub`] owns the fan-out algorithm: it validates topics, persists
//! broadcasts, derives one queue item per current subscriber, and schedules
//! best-effort delivery attempts through the connector registry. Everything
//! that must survive a crash lives in the store; the hub itself holds no
//! per-request state beyond the registry handle, so any number of request
//! handlers can share one clone.
//!
//! # Delivery model
//! A broadcast returns to the caller as soon as the message and its queue
//! items are persisted. Delivery attempts are fire-and-forget tasks: on
//! success they mark the item delivered, on failure they leave it pending
//! for the [`processor`] sweep. Losing such a task (crash, shutdown) only
//! defers delivery to the next processor tick; the at-least-once guarantee
//! comes from the store, not the task.
//!
//! # Errors
//! Failures before persistence are surfaced to the caller; failures after
//! (per-subscriber enqueue, send attempts, replay) are logged and swallowed
//! so one bad endpoint cannot fail a whole publish.
use crate::connectors::{Connector, ConnectorError, ConnectorRegistry};
use crate::model::{Message, Notification, QueueItem, Subscription};
use crate::store::{Store, StoreError};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod processor;
mod replay;

/// Number of most-recent messages replayed to a new subscriber.
pub const REPLAY_WINDOW: i64 = 20;
/// Queue-processor tick interval.
pub const RETRY_PERIOD: Duration = Duration::from_secs(10);
/// Per-attempt connector deadline.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum HubError {
    #[error("topic not found")]
    TopicNotFound,
    #[error("connector not found for provider: {0}")]
    ConnectorNotFound(String),
    #[error("target token is required for direct send")]
    TokenMissing,
    #[error("send timed out")]
    SendTimeout,
    #[error("send failed: {0}")]
    Send(#[from] ConnectorError),
    #[error("failed to encode notification envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A publish request. A non-empty `topic` selects broadcast mode; otherwise
/// `provider` + `token` select a synchronous direct send with no
/// persistence. `payload` is the publisher's JSON, kept verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    pub payload: Box<RawValue>,
}

#[derive(Clone)]
pub struct Hub {
    store: Arc<dyn Store>,
    connectors: ConnectorRegistry,
}

impl Hub {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            connectors: ConnectorRegistry::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Register (or replace) a connector under a provider name.
    pub fn register_connector(&self, name: &str, connector: Arc<dyn Connector>) {
        self.connectors.register(name, connector);
    }

    pub fn connector(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(name)
    }

    /// Publish. Broadcast when a topic is named, direct send otherwise.
    pub async fn route(&self, msg: RouteRequest) -> Result<(), HubError> {
        match msg.topic.as_deref().filter(|topic| !topic.is_empty()) {
            Some(topic) => self.broadcast(topic, &msg.payload).await,
            None => self.direct_send(&msg).await,
        }
    }

    async fn broadcast(&self, topic: &str, payload: &RawValue) -> Result<(), HubError> {
        if !self.store.topic_exists(topic).await? {
            return Err(HubError::TopicNotFound);
        }

        // The envelope form is what gets persisted and delivered, so replay
        // and live fan-out carry the same bytes.
        let envelope = Notification::wrap(topic, payload)?;
        let message_id = self.store.save_message(topic, &envelope).await?;
        metrics::counter!("nospam_broadcasts_total").increment(1);

        let subscribers = self.store.get_subscribers(topic).await?;
        if subscribers.is_empty() {
            tracing::info!(topic = %topic, "no subscribers; message persisted for replay");
            return Ok(());
        }

        for sub in subscribers {
            let queue_id = match self.store.enqueue_message(message_id, &sub.token).await {
                Ok(id) => id,
                Err(err) => {
                    // Best-effort fan-out: one bad subscriber must not fail
                    // the publish or the remaining enqueues.
                    tracing::warn!(
                        topic = %topic,
                        token = %sub.token,
                        error = %err,
                        "failed to enqueue message for subscriber"
                    );
                    continue;
                }
            };
            self.attempt_delivery(&sub.provider, sub.token, envelope.clone(), queue_id);
        }
        Ok(())
    }

    async fn direct_send(&self, msg: &RouteRequest) -> Result<(), HubError> {
        let provider = msg.provider.as_deref().unwrap_or_default();
        let connector = self
            .connector(provider)
            .ok_or_else(|| HubError::ConnectorNotFound(provider.to_string()))?;
        let token = msg
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(HubError::TokenMissing)?;
        tokio::time::timeout(
            SEND_TIMEOUT,
            connector.send(token, msg.payload.get().as_bytes()),
        )
        .await
        .map_err(|_| HubError::SendTimeout)??;
        Ok(())
    }

    /// Fire-and-forget delivery attempt for a freshly enqueued item. An
    /// unknown provider leaves the item pending for the processor sweep.
    pub(crate) fn attempt_delivery(
        &self,
        provider: &str,
        token: String,
        payload: Vec<u8>,
        queue_id: i64,
    ) {
        let Some(connector) = self.connector(provider) else {
            tracing::debug!(provider = %provider, queue_id, "no connector for provider; left pending");
            return;
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match tokio::time::timeout(SEND_TIMEOUT, connector.send(&token, &payload)).await {
                Ok(Ok(())) => {
                    if let Err(err) = store.mark_delivered(queue_id).await {
                        tracing::warn!(queue_id, error = %err, "failed to mark queue item delivered");
                    } else {
                        metrics::counter!("nospam_deliveries_total").increment(1);
                    }
                }
                Ok(Err(err)) => {
                    tracing::debug!(queue_id, token = %token, error = %err, "delivery attempt failed; left pending");
                }
                Err(_) => {
                    tracing::debug!(queue_id, token = %token, "delivery attempt timed out; left pending");
                }
            }
        });
    }

    /// Add a subscription and replay recent topic history to the new
    /// endpoint. Replay failures never fail the subscribe call.
    pub async fn subscribe(&self, topic: &str, sub: Subscription) -> Result<(), HubError> {
        if !self.store.topic_exists(topic).await? {
            return Err(HubError::TopicNotFound);
        }
        self.store.add_subscription(&sub).await?;

        let history = match self.store.get_recent_messages(topic, REPLAY_WINDOW).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(topic = %topic, error = %err, "failed to load history for replay");
                return Ok(());
            }
        };
        if !history.is_empty() {
            tracing::info!(
                topic = %topic,
                token = %sub.token,
                count = history.len(),
                "replaying recent messages to new subscriber"
            );
            replay::spawn_replay(self.clone(), history, sub);
        }
        Ok(())
    }

    pub async fn unsubscribe(&self, topic: &str, token: &str) -> Result<(), HubError> {
        Ok(self.store.remove_subscription(topic, token).await?)
    }

    // -----------------------------
    // Store passthroughs for the API facade
    // -----------------------------

    pub async fn create_topic(&self, name: &str) -> Result<(), HubError> {
        Ok(self.store.create_topic(name).await?)
    }

    pub async fn delete_topic(&self, name: &str) -> Result<(), HubError> {
        Ok(self.store.delete_topic(name).await?)
    }

    pub async fn list_topics(&self) -> Result<Vec<String>, HubError> {
        Ok(self.store.list_topics().await?)
    }

    /// Pending queue items for a topic. The store does not enforce topic
    /// existence here, so the hub does.
    pub async fn get_queue(&self, topic: &str) -> Result<Vec<QueueItem>, HubError> {
        if !self.store.topic_exists(topic).await? {
            return Err(HubError::TopicNotFound);
        }
        Ok(self.store.get_pending_by_topic(topic).await?)
    }

    pub async fn get_recent_messages(
        &self,
        topic: &str,
        limit: i64,
    ) -> Result<Vec<Message>, HubError> {
        Ok(self.store.get_recent_messages(topic, limit).await?)
    }

    pub async fn get_subscribers(&self, topic: &str) -> Result<Vec<Subscription>, HubError> {
        Ok(self.store.get_subscribers(topic).await?)
    }

    pub async fn get_subscriptions_by_user(
        &self,
        username: &str,
    ) -> Result<Vec<Subscription>, HubError> {
        Ok(self.store.get_subscriptions_by_user(username).await?)
    }

    pub async fn clear_topic_messages(&self, topic: &str) -> Result<(), HubError> {
        Ok(self.store.clear_topic_messages(topic).await?)
    }

    pub async fn clear_topic_subscribers(&self, topic: &str) -> Result<(), HubError> {
        Ok(self.store.clear_topic_subscribers(topic).await?)
    }

    pub async fn total_messages_sent(&self) -> Result<i64, HubError> {
        Ok(self.store.total_messages().await?)
    }

    pub async fn subscription_count(&self) -> Result<i64, HubError> {
        Ok(self.store.subscription_count().await?)
    }
}
