//! HTTP delivery of analysis results to a webhook endpoint.

use crate::diff::AnalysisResult;
use crate::utils::config::DEFAULT_WEBHOOK_TIMEOUT;
use crate::utils::error::NotifyError;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::Url;
use std::time::Duration;

/// Client for posting analysis results to a webhook
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    /// Create a client with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let url = url.into();
        validate_webhook_url(&url)?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }

    /// POST the result as JSON
    ///
    /// # Errors
    /// * `NotifyError::RequestFailed` - Connection, timeout or serialization failure
    /// * `NotifyError::Rejected` - Endpoint answered with a non-2xx status
    pub fn send(&self, result: &AnalysisResult) -> Result<(), NotifyError> {
        info!("Posting analysis result to webhook: {}", self.url);

        let response = self.client.post(&self.url).json(result).send()?;
        let status = response.status();
        debug!("Webhook responded with HTTP {}", status);

        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        Ok(())
    }
}

/// Post one result to `url` with the default timeout
///
/// **Public** - convenience wrapper used by the analyze command
pub fn send_webhook(url: &str, result: &AnalysisResult) -> Result<(), NotifyError> {
    WebhookClient::new(url)?.send(result)
}

/// Only absolute http(s) URLs with a host are accepted
pub fn validate_webhook_url(url: &str) -> Result<(), NotifyError> {
    let parsed =
        Url::parse(url).map_err(|e| NotifyError::InvalidUrl(format!("'{}': {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NotifyError::InvalidUrl(format!("'{}' is not an http(s) URL", url)));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(NotifyError::InvalidUrl(format!("'{}' has no host", url)));
    }

    Ok(())
}
