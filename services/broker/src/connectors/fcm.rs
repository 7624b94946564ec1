use super::{Connector, ConnectorError};
use crate::model::Notification;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
const FCM_TIMEOUT: Duration = Duration::from_secs(5);

/// Downstream message for Firebase Cloud Messaging.
///
/// The envelope is mapped into the `data` section (`topic` plus the
/// stringified publisher payload) so client apps handle rendering
/// themselves instead of relying on display notifications.
#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    to: &'a str,
    data: FcmData<'a>,
}

#[derive(Debug, Serialize)]
struct FcmData<'a> {
    topic: &'a str,
    payload: &'a str,
}

/// Sends device pushes through FCM.
///
/// Credentials come from the `--fcm-creds` file (the server key); with no
/// file configured the `FCM_SERVER_KEY` environment variable is consulted.
/// Without either, the connector stays registered but every send fails as
/// unavailable, leaving queue items pending until credentials appear after
/// a restart.
pub struct FcmConnector {
    client: reqwest::Client,
    server_key: Option<String>,
}

impl FcmConnector {
    pub fn new(credentials_file: &str) -> Result<Self, ConnectorError> {
        let server_key = if credentials_file.is_empty() {
            std::env::var("FCM_SERVER_KEY").ok()
        } else {
            match std::fs::read_to_string(credentials_file) {
                Ok(contents) => Some(contents.trim().to_string()),
                Err(err) => {
                    tracing::warn!(path = %credentials_file, error = %err, "failed to read fcm credentials");
                    None
                }
            }
        };
        match &server_key {
            Some(_) => tracing::info!("fcm connector initialized"),
            None => tracing::warn!("fcm connector has no credentials; sends will fail"),
        }
        let client = reqwest::Client::builder().timeout(FCM_TIMEOUT).build()?;
        Ok(Self { client, server_key })
    }
}

#[async_trait]
impl Connector for FcmConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        let Some(key) = self.server_key.as_deref() else {
            return Err(ConnectorError::Unavailable(
                "fcm credentials are not configured".into(),
            ));
        };

        // Broadcast payloads carry the envelope; direct sends may not.
        let (topic, inner) = match Notification::from_bytes(payload) {
            Some(envelope) => (envelope.topic, envelope.payload.get().to_string()),
            None => (String::new(), String::from_utf8_lossy(payload).into_owned()),
        };
        let message = FcmMessage {
            to: token,
            data: FcmData {
                topic: &topic,
                payload: &inner,
            },
        };

        let response = self
            .client
            .post(FCM_ENDPOINT)
            .header(reqwest::header::AUTHORIZATION, format!("key={key}"))
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Status(status.as_u16()));
        }
        tracing::debug!(token = %token, "fcm message accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_without_credentials_is_unavailable() {
        let connector = FcmConnector {
            client: reqwest::Client::new(),
            server_key: None,
        };
        let err = connector
            .send("device-1", b"{}")
            .await
            .expect_err("unavailable");
        assert!(matches!(err, ConnectorError::Unavailable(_)));
    }

    #[test]
    fn message_maps_envelope_into_data_fields() {
        let message = FcmMessage {
            to: "device-1",
            data: FcmData {
                topic: "orders",
                payload: r#"{"m":"hi"}"#,
            },
        };
        let json = serde_json::to_value(&message).expect("json");
        assert_eq!(json["to"], "device-1");
        assert_eq!(json["data"]["topic"], "orders");
        assert_eq!(json["data"]["payload"], r#"{"m":"hi"}"#);
    }
}
