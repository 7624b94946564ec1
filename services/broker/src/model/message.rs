use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A persisted broadcast. The payload holds the broker envelope bytes (see
/// [`Notification`]), not the publisher's raw body; messages are append-only
/// and never mutated after `save_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub topic: String,
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// On-wire envelope wrapped around every broadcast payload before it is
/// persisted, so delivered bodies carry their topic.
///
/// `payload` is the publisher's JSON verbatim: `RawValue` keeps the exact
/// bytes through serialize/deserialize, which the delivery round-trip
/// guarantees depend on. The webhook connector unwraps this envelope and
/// forwards only the inner payload; push connectors map both fields into a
/// provider-specific data section.
#[derive(Debug, Serialize, Deserialize)]
pub struct Notification {
    pub topic: String,
    pub payload: Box<RawValue>,
}

impl Notification {
    /// Serialize the envelope to the bytes that get persisted and delivered.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Wrap a publisher payload without taking ownership of it.
    pub fn wrap(topic: &str, payload: &RawValue) -> serde_json::Result<Vec<u8>> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            topic: &'a str,
            payload: &'a RawValue,
        }
        serde_json::to_vec(&Envelope { topic, payload })
    }

    /// Try to read envelope bytes back. Returns `None` for bodies that are
    /// not an envelope (e.g. direct sends), letting connectors fall back to
    /// forwarding the original payload.
    pub fn from_bytes(bytes: &[u8]) -> Option<Notification> {
        serde_json::from_slice(bytes).ok()
    }
}
