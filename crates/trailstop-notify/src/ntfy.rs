//! ntfy.sh push channel.
//!
//! Publishes by POSTing the message body to `{base_url}/{topic}` with the
//! subject in the `Title` header. The recipient is implied by the topic.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{NotifyError, NotifyResult};
use crate::Notifier;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Push notifier backed by an ntfy topic.
pub struct NtfyNotifier {
    client: Client,
    base_url: String,
    topic: String,
}

impl NtfyNotifier {
    /// Create a new ntfy channel.
    ///
    /// # Arguments
    /// * `base_url` - Server base (e.g. "https://ntfy.sh")
    /// * `topic` - Topic the user subscribes to
    pub fn new(base_url: impl Into<String>, topic: impl Into<String>) -> NotifyResult<Self> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(NotifyError::Config("ntfy topic is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            topic,
        })
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, message: &str, _recipient: &str, subject: &str) -> NotifyResult<()> {
        let url = format!("{}/{}", self.base_url, self.topic);
        debug!(topic = %self.topic, "Publishing ntfy notification");

        let response = self
            .client
            .post(&url)
            .header("Title", subject)
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| NotifyError::Delivery {
                channel: self.name().to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery {
                channel: self.name().to_string(),
                reason: format!("HTTP {status}"),
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "ntfy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_publishes_to_topic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alerts"))
            .and(header("Title", "Stop-loss alert"))
            .and(body_string("AAPL fell"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = NtfyNotifier::new(server.uri(), "alerts").unwrap();
        notifier
            .send("AAPL fell", "ignored", "Stop-loss alert")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_delivery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = NtfyNotifier::new(server.uri(), "alerts").unwrap();
        let err = notifier.send("m", "r", "s").await.unwrap_err();
        assert!(matches!(err, NotifyError::Delivery { .. }));
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert!(NtfyNotifier::new("https://ntfy.sh", " ").is_err());
    }
}
