use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::interpreter::AvailabilityInterpreter;
use crate::models::{MonitorEvent, PhoneModel, WatchList};
use crate::plugins::traits::{AvailabilitySource, NotifierPlugin};
use crate::utils::log_sink::LogSink;
use crate::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(3600),
        }
    }
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            heartbeat_interval: config.heartbeat_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorStats {
    pub passes: u64,
    pub checks: u64,
    pub fetch_failures: u64,
    pub in_stock: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub heartbeats: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CheckOutcome {
    InStock(String),
    OutOfStock,
    Unknown,
}

/// Polls every model of a watch list, notifying when pickup stock shows up.
pub struct Monitor {
    source: Arc<dyn AvailabilitySource>,
    notifier: Arc<dyn NotifierPlugin>,
    interpreter: AvailabilityInterpreter,
    sink: Arc<dyn LogSink>,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(
        source: Arc<dyn AvailabilitySource>,
        notifier: Arc<dyn NotifierPlugin>,
        sink: Arc<dyn LogSink>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            interpreter: AvailabilityInterpreter::new(),
            sink,
            settings,
        }
    }

    /// Run the loop on its own task. The watch list moves into the task.
    pub fn spawn(self, watch_list: WatchList) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(watch_list, token).await });

        MonitorHandle { cancel, task }
    }

    /// Runs until `cancel` fires. Cancellation is honoured at the top of each
    /// pass and while waiting between passes; a pass in progress is finished.
    pub async fn run(&self, watch_list: WatchList, cancel: CancellationToken) -> MonitorStats {
        let mut stats = MonitorStats::default();

        self.sink.info(&format!(
            "Monitoring {} model(s) via {}, notifying through {}",
            watch_list.len(),
            self.source.name(),
            self.notifier.name()
        ));
        self.send(&MonitorEvent::SessionStarted { watched: watch_list.len() }, &mut stats)
            .await;

        let mut next_heartbeat = Instant::now() + self.settings.heartbeat_interval;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            self.check_pass(&watch_list, &mut stats).await;
            stats.passes += 1;
            metrics::counter!("pickup_watcher_passes_total").increment(1);

            if Instant::now() >= next_heartbeat {
                self.send(&MonitorEvent::Heartbeat, &mut stats).await;
                stats.heartbeats += 1;
                next_heartbeat += self.settings.heartbeat_interval;
            }

            self.sink.info(&format!(
                "Waiting {} before checking again...",
                format_interval(self.settings.poll_interval)
            ));

            if cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        self.sink.info(&format!("Monitor stopped after {} pass(es)", stats.passes));
        stats
    }

    async fn check_pass(&self, watch_list: &WatchList, stats: &mut MonitorStats) {
        for model in watch_list {
            stats.checks += 1;
            match self.check_model(model).await {
                CheckOutcome::InStock(store) => {
                    stats.in_stock += 1;
                    let event = MonitorEvent::InStock {
                        model: model.clone(),
                        store,
                    };
                    self.send(&event, stats).await;
                    self.sink.info(&event.message());
                }
                CheckOutcome::OutOfStock => {
                    self.sink.info(&format!("{} is currently out of stock", model.label()));
                }
                CheckOutcome::Unknown => {
                    stats.fetch_failures += 1;
                }
            }
        }
    }

    async fn check_model(&self, model: &PhoneModel) -> CheckOutcome {
        metrics::counter!("pickup_watcher_fetch_total").increment(1);

        let payload = match self.source.fetch(model.code()).await {
            Ok(payload) => payload,
            Err(e) => {
                metrics::counter!("pickup_watcher_fetch_failures_total").increment(1);
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                self.sink.error(&format!(
                    "Failed to fetch availability for {} [{}]: {}",
                    model.label(),
                    model.code(),
                    reason
                ));
                return CheckOutcome::Unknown;
            }
        };
        self.sink.info(&format!("Fetched availability data for {}", model.code()));

        match self.interpreter.interpret(&payload, model.code()) {
            Ok(result) => match result.location_name {
                Some(store) if result.available => {
                    metrics::counter!("pickup_watcher_in_stock_total").increment(1);
                    CheckOutcome::InStock(store)
                }
                _ => CheckOutcome::OutOfStock,
            },
            Err(e) => {
                self.sink.error(&format!(
                    "Unreadable availability data for {}: {}",
                    model.label(),
                    e
                ));
                CheckOutcome::OutOfStock
            }
        }
    }

    async fn send(&self, event: &MonitorEvent, stats: &mut MonitorStats) {
        match self.notifier.notify(&event.message()).await {
            Ok(_) => {
                stats.notifications_sent += 1;
                self.sink.info("Notification sent");
            }
            Err(e) => {
                stats.notifications_failed += 1;
                metrics::counter!("pickup_watcher_notifications_failed_total").increment(1);
                self.sink.error(&format!("Notification failed: {}", e));
            }
        }
    }
}

/// Owner's side of a running monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<MonitorStats>,
}

impl MonitorHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request a stop and wait for the loop to reach a cancellation point.
    pub async fn stop(self) -> Result<MonitorStats> {
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| AppError::Internal(format!("monitor task failed: {}", e)))
    }
}

fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}
