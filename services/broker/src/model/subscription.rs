use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A durable binding between a topic and a delivery endpoint.
///
/// `(topic, token)` is the primary key: a given endpoint subscribes at most
/// once per topic. `token` is opaque to the broker: a device token for
/// fcm/apns, an absolute URL for webhook, anything for mock. `provider`
/// selects the connector used for delivery, and `username` records the
/// account that created the subscription for ownership checks and listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    pub topic: String,
    pub token: String,
    pub provider: String,
    pub username: String,
}
