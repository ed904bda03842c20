//! Reqwest-backed transport: one POST per exchange, no retries.

use super::{ChatReply, ChatRequest, ReplyTransport, TransportError};
use crate::config::WidgetConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct WebhookTransport {
    client: Client,
    endpoint: String,
}

impl WebhookTransport {
    /// The client carries the configured timeout so a hung endpoint settles
    /// like any other connection failure instead of wedging the busy flag.
    pub fn new(config: &WidgetConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(TransportError::Network)?;
        Ok(Self {
            client,
            endpoint: config.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl ReplyTransport for WebhookTransport {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(TransportError::Malformed)?;
        debug!(endpoint = %self.endpoint, "webhook exchange completed");
        Ok(ChatReply::from_value(&body))
    }
}
