use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("No models found for family: {family}")]
    NoMatchingModels { family: String },

    #[error("Notification error: {status}: {message}")]
    Notification { status: u16, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        AppError::Catalog {
            message: message.into(),
        }
    }

    /// Whether the fetch failed because the remote did not answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Http(e) if e.is_timeout())
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
