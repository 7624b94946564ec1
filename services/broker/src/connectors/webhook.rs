use super::{Connector, ConnectorError};
use crate::model::Notification;
use async_trait::async_trait;
use std::time::Duration;

/// Per-request ceiling for webhook targets, kept short so a slow receiver
/// cannot stall a processor tick for long.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delivers by POSTing JSON to the subscription token, which for this
/// provider is an absolute URL.
///
/// Broadcast payloads arrive wrapped in the `{topic, payload}` envelope; the
/// receiver only cares about the publisher's body, so the envelope is
/// unwrapped and the inner payload forwarded verbatim. Direct sends are not
/// enveloped and pass through untouched.
pub struct WebhookConnector {
    client: reqwest::Client,
}

impl WebhookConnector {
    pub fn new() -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Connector for WebhookConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        if token.is_empty() {
            return Err(ConnectorError::Unavailable("webhook url is missing".into()));
        }

        let body = match Notification::from_bytes(payload) {
            Some(envelope) => envelope.payload.get().as_bytes().to_vec(),
            None => payload.to_vec(),
        };

        let response = self
            .client
            .post(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        // Success is strictly 2xx; redirects count as failure.
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::routing::post;
    use axum::Router;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Received {
        bodies: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    async fn spawn_receiver(status: axum::http::StatusCode) -> (String, Received) {
        let received = Received::default();
        let app = Router::new()
            .route(
                "/hook",
                post(
                    move |State(state): State<Received>, body: axum::body::Bytes| async move {
                        state.bodies.lock().expect("lock").push(body.to_vec());
                        status
                    },
                ),
            )
            .with_state(received.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("serve");
        });
        (format!("http://{addr}/hook"), received)
    }

    #[tokio::test]
    async fn unwraps_envelope_and_posts_inner_payload() {
        let (url, received) = spawn_receiver(axum::http::StatusCode::OK).await;
        let connector = WebhookConnector::new().expect("connector");

        let envelope = br#"{"topic":"orders","payload":{"m":"hi"}}"#;
        connector.send(&url, envelope).await.expect("send");

        let bodies = received.bodies.lock().expect("lock");
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0], br#"{"m":"hi"}"#);
    }

    #[tokio::test]
    async fn forwards_non_envelope_payloads_unchanged() {
        let (url, received) = spawn_receiver(axum::http::StatusCode::OK).await;
        let connector = WebhookConnector::new().expect("connector");

        connector.send(&url, br#"{"direct":true}"#).await.expect("send");

        let bodies = received.bodies.lock().expect("lock");
        assert_eq!(bodies[0], br#"{"direct":true}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, _received) = spawn_receiver(axum::http::StatusCode::INTERNAL_SERVER_ERROR).await;
        let connector = WebhookConnector::new().expect("connector");

        let err = connector.send(&url, b"{}").await.expect_err("failure");
        assert!(matches!(err, ConnectorError::Status(500)));
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let connector = WebhookConnector::new().expect("connector");
        let err = connector.send("", b"{}").await.expect_err("missing url");
        assert!(matches!(err, ConnectorError::Unavailable(_)));
    }
}
