use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Where the monitor gets raw availability payloads from.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the fulfillment payload for one part number.
    async fn fetch(&self, part_number: &str) -> Result<serde_json::Value>;
}
