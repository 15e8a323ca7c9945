//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `inkbird.toml` from the configuration directory. The file itself is
//! mandatory; inside it every field but `sensor.address` has a default.
//! Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use inkbird_adapter_ble::BleConfig;
use inkbird_adapter_mqtt::MqttConfig;
use inkbird_app::services::poll_loop::{PollSettings, RunMode};
use serde::Deserialize;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "inkbird.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection and publishing.
    pub mqtt: MqttConfig,
    /// Sensor address and BLE settings.
    pub sensor: BleConfig,
    /// Polling settings.
    pub general: GeneralConfig,
    /// Daemon mode toggle.
    pub daemon: DaemonConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Polling settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Seconds between two readings in daemon mode.
    pub read_interval_secs: u64,
    /// Also publish `{topic}/fahrenheit`.
    pub publish_fahrenheit: bool,
}

/// Daemon mode configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Loop forever. When `false`, read once and exit.
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path`, then apply environment-variable
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed, or
    /// if the resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("INKBIRD_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(val) = lookup("INKBIRD_MQTT_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.broker_port = port;
            }
        }
        if let Some(val) = lookup("INKBIRD_MQTT_USERNAME") {
            self.mqtt.username = Some(val);
        }
        if let Some(val) = lookup("INKBIRD_MQTT_PASSWORD") {
            self.mqtt.password = Some(val);
        }
        if let Some(val) = lookup("INKBIRD_SENSOR_ADDRESS") {
            self.sensor.address = val;
        }
        if let Some(val) = lookup("INKBIRD_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "mqtt.broker_host must not be empty".to_string(),
            ));
        }
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        if self.mqtt.qos > 2 {
            return Err(ConfigError::Validation(format!(
                "mqtt.qos must be 0, 1 or 2, got {}",
                self.mqtt.qos
            )));
        }
        if self.sensor.address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sensor.address is required".to_string(),
            ));
        }
        if self.daemon.enabled && self.general.read_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "general.read_interval_secs must be non-zero in daemon mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the run mode; `once` (from the command line) wins over the
    /// `[daemon]` section.
    #[must_use]
    pub fn run_mode(&self, once: bool) -> RunMode {
        if once || !self.daemon.enabled {
            RunMode::Once
        } else {
            RunMode::Daemon {
                interval: Duration::from_secs(self.general.read_interval_secs),
            }
        }
    }

    /// Settings for the poll loop.
    #[must_use]
    pub fn poll_settings(&self, once: bool) -> PollSettings {
        PollSettings {
            topic: self.mqtt.topic.clone(),
            mode: self.run_mode(once),
            publish_fahrenheit: self.general.publish_fahrenheit,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            read_interval_secs: 3600,
            publish_fahrenheit: false,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "inkbird=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("no configuration file {path}")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// File I/O failure.
    #[error("failed to read config file {path}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
