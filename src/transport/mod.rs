//! Wire types for the webhook exchange, plus the transport seam.

pub mod webhook;

pub use webhook::WebhookTransport;

use crate::session::{ChatMessage, Role};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Reply text used when the webhook answers 2xx but carries none of the
/// recognized reply fields.
pub const DEFAULT_REPLY: &str = "Sorry, I didn't quite catch that. Could you try rephrasing?";

/// Outbound POST body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub user_info: UserInfo,
    pub conversation_history: Vec<HistoryEntry>,
}

/// Context about the page hosting the widget.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub page: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// Parsed webhook reply. Only the reply text is required; everything else the
/// endpoint sends (timestamp, sessionId, status) is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
}

impl ChatReply {
    /// Lenient extraction: `response`, then `reply`, then `message`, then a
    /// generic default. Missing or oddly-typed fields never fail.
    pub fn from_value(body: &Value) -> Self {
        let text = ["response", "reply", "message"]
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str))
            .unwrap_or(DEFAULT_REPLY)
            .to_string();
        Self { text }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("webhook returned HTTP {0}")]
    Status(u16),

    #[error("webhook returned a malformed body: {0}")]
    Malformed(reqwest::Error),
}

/// The one suspension point of the widget: send a request, await the settled
/// outcome. Implemented by `WebhookTransport` in production and by mocks in
/// tests.
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatReply, TransportError>;
}
