//! ntfy push sink.

use std::time::Duration;

use async_trait::async_trait;
use crewline_core::ports::{NotificationSink, SinkError};
use tracing::debug;
use url::Url;

use crate::config::NotifyConfig;

/// Posts each message as the plain-text body of `{base_url}/{topic}`.
#[derive(Debug, Clone)]
pub struct NtfySink {
    client: reqwest::Client,
    endpoint: Url,
}

impl NtfySink {
    pub fn new(config: &NotifyConfig) -> Result<Self, SinkError> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = Url::parse(&format!("{}/{}", base, config.topic.trim())).map_err(|e| {
            SinkError::Transport {
                message: format!("invalid notification endpoint: {}", e),
            }
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SinkError::Transport {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationSink for NtfySink {
    async fn send(&self, message: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .body(message.to_string())
            .send()
            .await
            .map_err(|e| SinkError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        debug!(endpoint = %self.endpoint, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_topic() {
        let config = NotifyConfig {
            base_url: "https://ntfy.example.com/".into(),
            ..NotifyConfig::default()
        };
        let sink = NtfySink::new(&config).unwrap();
        assert_eq!(sink.endpoint().as_str(), "https://ntfy.example.com/CrewLineup");
    }
}
