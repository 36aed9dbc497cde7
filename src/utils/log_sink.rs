use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.level {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        };
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            level,
            self.message
        )
    }
}

/// Destination for the monitor's log lines.
///
/// The monitor never talks to a global logger directly; the host hands it a
/// sink and decides how the lines are displayed or stored.
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards every line to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Lines buffered for the host before new ones are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Sends lines to a host-side receiver, mirroring them to `tracing`.
///
/// The channel is bounded: when the host falls behind, new lines are dropped
/// from the channel (they still reach `tracing`) and counted.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<LogLine>,
    dropped: Arc<AtomicU64>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<LogLine>) {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<LogLine>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let sink = Self {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (sink, receiver)
    }

    /// Lines that did not fit in the channel.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn push(&self, line: LogLine) {
        match self.sender.try_send(line) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            // The host stopped displaying lines
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

impl LogSink for ChannelSink {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.push(LogLine::new(LogLevel::Info, message));
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.push(LogLine::new(LogLevel::Error, message));
    }
}
