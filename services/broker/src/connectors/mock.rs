use super::{Connector, ConnectorError};
use async_trait::async_trait;

/// Connector that logs the delivery and reports success. Useful for local
/// development and as the default provider in tests.
#[derive(Debug, Default)]
pub struct MockConnector;

impl MockConnector {
    pub fn new() -> Self {
        MockConnector
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        tracing::info!(
            token = %token,
            payload = %String::from_utf8_lossy(payload),
            "mock connector delivering"
        );
        Ok(())
    }
}
