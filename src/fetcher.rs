use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::plugins::traits::AvailabilitySource;
use crate::utils::user_agent::random_user_agent;
use crate::{AppError, Result};

/// Queries the retailer's fulfillment-messages endpoint, one part number per call.
#[derive(Debug, Clone)]
pub struct AvailabilityFetcher {
    client: Client,
    endpoint: String,
    store: String,
}

impl AvailabilityFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Self::with_timeout(config.endpoint.clone(), config.store.clone(), config.timeout())
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        store: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            store: store.into(),
        })
    }

    fn query<'a>(&'a self, part_number: &'a str) -> [(&'static str, &'a str); 7] {
        [
            ("pl", "true"),
            ("mts.0", "regular"),
            ("mts.1", "compact"),
            ("cppart", "UNLOCKED/WW"),
            ("parts.0", part_number),
            ("searchNearby", "true"),
            ("store", self.store.as_str()),
        ]
    }

    pub async fn request_availability(&self, part_number: &str) -> Result<Value> {
        let start_time = std::time::Instant::now();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(part_number))
            .header(USER_AGENT, random_user_agent())
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::parse(format!(
                "availability response for {} is not JSON: {}",
                part_number, e
            ))
        })?;

        tracing::debug!(
            "Fetched availability for {} in {}ms",
            part_number,
            start_time.elapsed().as_millis()
        );
        Ok(payload)
    }
}

#[async_trait]
impl AvailabilitySource for AvailabilityFetcher {
    fn name(&self) -> &str {
        "fulfillment-messages"
    }

    async fn fetch(&self, part_number: &str) -> Result<Value> {
        self.request_availability(part_number).await
    }
}
