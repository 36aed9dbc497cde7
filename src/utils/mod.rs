pub mod error;
pub mod log_sink;
pub mod logger;
pub mod user_agent;
