//! History replay for new subscribers.
//!
//! On subscribe, the hub loads up to [`super::REPLAY_WINDOW`] recent
//! messages (oldest first) and hands them here. The replay runs detached
//! from the subscribe call: each message gets its own queue item and a
//! best-effort delivery attempt, exactly like the live broadcast path.
//! Items whose attempt fails stay pending and are retried by the queue
//! processor.
use super::Hub;
use crate::model::{Message, Subscription};
use tokio::task::JoinHandle;

pub(crate) fn spawn_replay(hub: Hub, history: Vec<Message>, sub: Subscription) -> JoinHandle<()> {
    tokio::spawn(async move {
        for message in history {
            let queue_id = match hub.store().enqueue_message(message.id, &sub.token).await {
                Ok(id) => id,
                Err(err) => {
                    tracing::warn!(
                        message_id = message.id,
                        token = %sub.token,
                        error = %err,
                        "failed to enqueue replay message"
                    );
                    continue;
                }
            };
            hub.attempt_delivery(&sub.provider, sub.token.clone(), message.payload, queue_id);
        }
    })
}
