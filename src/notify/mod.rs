//! Delivery of analysis results to external endpoints.

pub mod webhook;

pub use webhook::{send_webhook, validate_webhook_url, WebhookClient};
