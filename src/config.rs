use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_AVAILABILITY_ENDPOINT: &str =
    "https://www.apple.com/tw/shop/fulfillment-messages";
pub const DEFAULT_NOTIFY_ENDPOINT: &str = "https://notify-api.line.me/api/notify";
const ENV_PREFIX: &str = "PICKUP";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub fetcher: FetcherConfig,
    pub notifier: NotifierConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub endpoint: String,
    pub store: String,
    pub request_timeout: u64,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval: u64,
    pub heartbeat_interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "resources/iphone_models.json".to_string(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AVAILABILITY_ENDPOINT.to_string(),
            store: "R713".to_string(),
            request_timeout: 10,
            accept_language: "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_NOTIFY_ENDPOINT.to_string(),
            token: None,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: 300,
            heartbeat_interval: 3600,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "log".to_string(),
            file_name: "app.log".to_string(),
            level: "pickup_watcher=info".to_string(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9001,
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval)
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, `config/default`, an optional user file,
    /// then `PICKUP__*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_file, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(config_file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let s = builder.add_source(env).build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.path.trim().is_empty() {
            return Err(ConfigError::Message("Catalog path must not be empty".into()));
        }

        if Url::parse(&self.fetcher.endpoint).is_err() {
            return Err(ConfigError::Message("Invalid fetcher endpoint URL".into()));
        }

        if self.fetcher.store.trim().is_empty() {
            return Err(ConfigError::Message("Fetcher store must not be empty".into()));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Fetcher request_timeout must be greater than 0".into(),
            ));
        }

        if Url::parse(&self.notifier.endpoint).is_err() {
            return Err(ConfigError::Message("Invalid notifier endpoint URL".into()));
        }

        if self.monitor.poll_interval == 0 {
            return Err(ConfigError::Message(
                "Monitor poll_interval must be greater than 0".into(),
            ));
        }

        if self.monitor.heartbeat_interval == 0 {
            return Err(ConfigError::Message(
                "Monitor heartbeat_interval must be greater than 0".into(),
            ));
        }

        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Message("Metrics port must be greater than 0".into()));
        }

        Ok(())
    }
}
