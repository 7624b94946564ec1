use super::{Connector, ConnectorError};
use async_trait::async_trait;

/// Apple Push Notification Service connector.
// TODO: wire the HTTP/2 token-authenticated call to api.push.apple.com;
// until then this logs the attempt and reports success.
#[derive(Debug, Default)]
pub struct ApnsConnector;

impl ApnsConnector {
    pub fn new() -> Self {
        ApnsConnector
    }
}

#[async_trait]
impl Connector for ApnsConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        tracing::info!(
            token = %token,
            payload = %String::from_utf8_lossy(payload),
            "apns connector delivering"
        );
        Ok(())
    }
}
