// Integration tests for Pickup Watcher
// These tests drive the monitor through its public API with scripted
// collaborators and against a local mock HTTP server.

pub mod end_to_end_tests;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pickup_watcher::models::CatalogEntry;
use pickup_watcher::plugins::traits::{AvailabilitySource, NotificationResult, NotifierPlugin};
use pickup_watcher::utils::log_sink::{LogLevel, LogLine};
use pickup_watcher::{AppError, PhoneModel};

pub fn phone(code: &str, color: &str) -> PhoneModel {
    PhoneModel::from_entry(
        code,
        CatalogEntry {
            name: "iPhone 16 Pro".to_string(),
            price: Decimal::from(36900),
            currency: "TWD".to_string(),
            capacity: "256GB".to_string(),
            color: color.to_string(),
        },
    )
}

/// Payload in the newer `content.pickupMessage` shape.
pub fn available_payload(code: &str, store: &str) -> Value {
    json!({"body": {"content": {"pickupMessage": {"stores": [
        {"storeName": store, "partsAvailability": {code: {"pickupDisplay": "available"}}}
    ]}}}})
}

/// Payload in the older `PickupMessage` shape.
pub fn unavailable_payload(code: &str) -> Value {
    json!({"body": {"PickupMessage": {"stores": [
        {"storeName": "Xinyi A13", "partsAvailability": {code: {"pickupDisplay": "unavailable"}}}
    ]}}})
}

#[derive(Clone)]
pub enum Scripted {
    Payload(Value),
    Failure(String),
}

/// Availability source answering from a fixed script, optionally slowly.
#[derive(Default)]
pub struct ScriptedSource {
    responses: HashMap<String, Scripted>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, code: &str, response: Scripted) -> Self {
        self.responses.insert(code.to_string(), response);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilitySource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, part_number: &str) -> pickup_watcher::Result<Value> {
        self.calls.lock().unwrap().push(part_number.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.get(part_number) {
            Some(Scripted::Payload(payload)) => Ok(payload.clone()),
            Some(Scripted::Failure(message)) => Err(AppError::Internal(message.clone())),
            None => Ok(json!({})),
        }
    }
}

/// Notifier that records every message and accepts it.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifierPlugin for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    fn plugin_type(&self) -> &str {
        "test"
    }

    async fn notify(&self, message: &str) -> pickup_watcher::Result<NotificationResult> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(NotificationResult {
            status: 200,
            delivered_at: chrono::Utc::now(),
        })
    }
}

/// Drain everything a `ChannelSink` has delivered so far.
pub fn drain(receiver: &mut tokio::sync::mpsc::Receiver<LogLine>) -> Vec<LogLine> {
    let mut lines = Vec::new();
    while let Ok(line) = receiver.try_recv() {
        lines.push(line);
    }
    lines
}

pub fn position(lines: &[LogLine], level: LogLevel, needle: &str) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.level == level && line.message.contains(needle))
}

/// Helper to wait for async operations
pub async fn wait_for_condition<F, Fut>(mut condition: F, timeout_seconds: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_seconds);

    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    false
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
