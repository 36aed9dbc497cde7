pub mod catalog;
pub mod catalog_seeder;
pub mod config;
pub mod fetcher;
pub mod interpreter;
pub mod models;
pub mod monitor;
pub mod plugins;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use models::{AvailabilityResult, PhoneModel, WatchList};
pub use monitor::{Monitor, MonitorHandle, MonitorSettings, MonitorStats};
pub use utils::error::AppError;
pub use utils::log_sink::{ChannelSink, LogSink, TracingSink};

pub type Result<T> = std::result::Result<T, AppError>;
