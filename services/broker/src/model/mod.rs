//! Broker data model module.
//!
//! # Purpose
//! Re-exports the core topic/subscription/message/queue/user models shared by
//! the store backends, the hub, and the API layer.
mod message;
mod queue;
mod subscription;
mod user;

pub use message::{Message, Notification};
pub use queue::{QueueItem, QueueStatus};
pub use subscription::Subscription;
pub use user::{Role, User};
