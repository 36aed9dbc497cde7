use serde::{Deserialize, Serialize};

use crate::models::PhoneModel;

/// Outcome of interpreting one availability payload for one part number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub available: bool,
    pub location_name: Option<String>,
}

impl AvailabilityResult {
    pub fn available_at(store_name: impl Into<String>) -> Self {
        Self {
            available: true,
            location_name: Some(store_name.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Messages the monitor pushes to the notification service.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    SessionStarted { watched: usize },
    InStock { model: PhoneModel, store: String },
    Heartbeat,
}

impl MonitorEvent {
    pub fn message(&self) -> String {
        match self {
            MonitorEvent::SessionStarted { watched } => {
                format!("Watcher started, monitoring pickup availability for {} model(s).", watched)
            }
            MonitorEvent::InStock { model, store } => {
                format!("{} is available for pickup at {}!", model.label(), store)
            }
            MonitorEvent::Heartbeat => "Watcher is still running.".to_string(),
        }
    }
}
