//! Provider connectors and the name-keyed connector registry.
//!
//! # Purpose
//! A [`Connector`] is a single capability: deliver an opaque payload to an
//! endpoint token. The hub and the queue processor look connectors up by
//! provider name at delivery time, so providers can be registered at runtime
//! without the routing core knowing any wire details.
//!
//! Provider names are free strings. An unknown provider on a queue item is
//! a skippable, non-fatal event for the processor; only direct sends surface
//! it to the caller.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

mod apns;
mod fcm;
mod mock;
mod webhook;

pub use apns::ApnsConnector;
pub use fcm::FcmConnector;
pub use mock::MockConnector;
pub use webhook::WebhookConnector;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connector exists but cannot send (missing credentials, missing
    /// endpoint URL).
    #[error("connector unavailable: {0}")]
    Unavailable(String),
    /// The provider endpoint answered outside the success range.
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Provider-polymorphic send operation. `token` is interpreted by the
/// implementation (device token, webhook URL, ...); `payload` is the bytes
/// persisted for the queue item: an envelope for broadcasts, the raw
/// publisher body for direct sends.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError>;
}

/// Thread-safe, name-keyed connector registry.
///
/// Reads vastly outnumber writes (registration normally happens once at
/// startup), so a reader/writer lock fits: many concurrent lookups, an
/// exclusive writer for registration. Registration overwrites silently.
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn Connector>>>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, connector: Arc<dyn Connector>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), connector);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Connector>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingConnector {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Connector for CountingConnector {
        async fn send(&self, _token: &str, _payload: &[u8]) -> Result<(), ConnectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn register_lookup_and_overwrite() {
        let registry = ConnectorRegistry::new();
        assert!(registry.get("mock").is_none());

        let first = Arc::new(CountingConnector {
            calls: AtomicU32::new(0),
        });
        registry.register("mock", first.clone());
        let found = registry.get("mock").expect("registered");
        found.send("t", b"{}").await.expect("send");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);

        // Re-registration replaces the previous connector.
        let second = Arc::new(CountingConnector {
            calls: AtomicU32::new(0),
        });
        registry.register("mock", second.clone());
        registry
            .get("mock")
            .expect("registered")
            .send("t", b"{}")
            .await
            .expect("send");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lookups_share_the_registry_across_clones() {
        let registry = ConnectorRegistry::new();
        let clone = registry.clone();
        registry.register(
            "mock",
            Arc::new(CountingConnector {
                calls: AtomicU32::new(0),
            }),
        );
        assert!(clone.get("mock").is_some());
    }
}
