use crate::config::{NotifierConfig, DEFAULT_NOTIFY_ENDPOINT};
use crate::plugins::traits::{NotifierPlugin, NotificationResult};
use crate::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Bearer token for the notification service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AppError::Validation("Notification token must not be empty".to_string()));
        }
        Ok(Credential(token))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Posts plain text messages to LINE Notify.
#[derive(Debug, Clone)]
pub struct LineNotifier {
    client: Client,
    endpoint: String,
    credential: Credential,
}

impl LineNotifier {
    pub fn new(credential: Credential) -> Self {
        Self::with_endpoint(DEFAULT_NOTIFY_ENDPOINT, credential)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, credential: Credential) -> Self {
        LineNotifier {
            client: Client::new(),
            endpoint: endpoint.into(),
            credential,
        }
    }

    pub fn from_config(config: &NotifierConfig, credential: Credential) -> Self {
        Self::with_endpoint(config.endpoint.clone(), credential)
    }
}

#[async_trait]
impl NotifierPlugin for LineNotifier {
    fn name(&self) -> &str {
        "LINE Notifier"
    }

    fn plugin_type(&self) -> &str {
        "line"
    }

    async fn notify(&self, message: &str) -> Result<NotificationResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .form(&[("message", message)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Notification {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(NotificationResult {
            status: status.as_u16(),
            delivered_at: chrono::Utc::now(),
        })
    }
}
