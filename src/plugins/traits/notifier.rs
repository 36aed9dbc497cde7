use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub status: u16,
    pub delivered_at: DateTime<Utc>,
}

/// Trait for push-notification channels.
///
/// `Ok` means the service accepted the message. A rejected message
/// (unexpected status) is `AppError::Notification`; transport problems are
/// `AppError::Http`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    async fn notify(&self, message: &str) -> Result<NotificationResult>;
}
