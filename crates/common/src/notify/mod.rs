//! Notification sender abstraction
//!
//! Notifications are fire-and-forget: the core never waits on delivery
//! confirmation, and a failed send is logged without failing the request
//! that triggered it.

use crate::config::MailConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What a notification is about; serialized names match the mail
/// templates of the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "createArticle")]
    ArticleSubmitted,
    #[serde(rename = "updateArticle")]
    ArticleUpdated,
    #[serde(rename = "createEditor")]
    EditorCreated,
}

/// An outbound notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub to: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub data: serde_json::Value,
}

/// Trait for the notification-sender collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand a notification to the sender; no delivery guarantee
    async fn send(&self, notification: Notification) -> Result<()>;
}

/// Notifier that POSTs notifications to a mail relay webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    relay_url: String,
    from_address: String,
}

#[derive(Serialize)]
struct RelayEnvelope<'a> {
    from: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl WebhookNotifier {
    pub fn new(relay_url: String, from_address: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            relay_url,
            from_address,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(&RelayEnvelope {
                from: &self.from_address,
                notification: &notification,
            })
            .send()
            .await
            .map_err(|e| AppError::Notification {
                message: format!("Relay request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification {
                message: format!("Relay error {}: {}", status, body),
            });
        }

        crate::metrics::record_notification(true);
        Ok(())
    }
}

/// Notifier that drops everything; used when no relay is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        tracing::debug!(
            to = %notification.to,
            kind = ?notification.kind,
            "Notification dropped (no relay configured)"
        );
        Ok(())
    }
}

/// Notifier that records sends in memory; used by tests
#[derive(Default)]
pub struct MemoryNotifier {
    sent: tokio::sync::Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, notification: Notification) -> Result<()> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

/// Create a notifier based on configuration
pub fn create_notifier(config: &MailConfig) -> Arc<dyn Notifier> {
    match &config.relay_url {
        Some(url) => Arc::new(WebhookNotifier::new(
            url.clone(),
            config.from_address.clone(),
            config.timeout_secs,
        )),
        None => {
            tracing::warn!("No mail relay configured, notifications will be dropped");
            Arc::new(NoopNotifier)
        }
    }
}
