use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Delivery state of a queue item. The only legal transition is
/// `Pending -> Delivered`; delivered is terminal and items are never
/// re-opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Delivered,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Delivered => "delivered",
        }
    }

    pub fn parse(value: &str) -> Option<QueueStatus> {
        match value {
            "pending" => Some(QueueStatus::Pending),
            "delivered" => Some(QueueStatus::Delivered),
            _ => None,
        }
    }
}

/// One (message x subscriber) delivery attempt record.
///
/// The authoritative row stores only `(id, message_id, token, status)`;
/// `topic`, `payload` and `provider` are resolved from the message and
/// subscription tables when pending items are loaded, so the processor can
/// attempt delivery without issuing further queries. A missing provider
/// (subscription removed since enqueue) comes back empty and is skipped by
/// the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub id: i64,
    pub message_id: i64,
    pub topic: String,
    pub token: String,
    pub provider: String,
    pub status: QueueStatus,
    pub payload: Vec<u8>,
}
