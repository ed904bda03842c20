//! Widget configuration: webhook endpoint, host-page context, request timeout.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Endpoint that receives chat requests and returns assistant replies.
    pub webhook_url: String,
    /// Full URL of the page embedding the widget, sent as request context.
    pub page_url: String,
    /// Path component of `page_url`.
    pub page_path: String,
    pub request_timeout_secs: u64,
}

impl WidgetConfig {
    pub fn new(webhook_url: &str, page_url: &str) -> Result<Self> {
        let webhook = Url::parse(webhook_url)
            .with_context(|| format!("invalid webhook URL: {}", webhook_url))?;
        let page = Url::parse(page_url)
            .with_context(|| format!("invalid page URL: {}", page_url))?;
        Ok(Self {
            webhook_url: webhook.to_string(),
            page_url: page.to_string(),
            page_path: page.path().to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Loads configuration from the environment (a `.env` file is honored).
    ///
    /// Required: `CHAT_WEBHOOK_URL`, `CHAT_PAGE_URL`.
    /// Optional: `CHAT_REQUEST_TIMEOUT_SECS` (defaults to 30).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let required_vars = ["CHAT_WEBHOOK_URL", "CHAT_PAGE_URL"];
        let missing: Vec<_> = required_vars
            .iter()
            .filter(|var| std::env::var(var).is_err())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let mut config = Self::new(
            &std::env::var("CHAT_WEBHOOK_URL")?,
            &std::env::var("CHAT_PAGE_URL")?,
        )?;
        if let Ok(secs) = std::env::var("CHAT_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("invalid CHAT_REQUEST_TIMEOUT_SECS: {}", secs))?;
        }
        Ok(config)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            webhook_url: "http://localhost:5678/webhook/chat".to_string(),
            page_url: "http://localhost/".to_string(),
            page_path: "/".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
