//! MQTT publisher configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the MQTT publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Base topic; readings are published below it (`{topic}/celsius`).
    pub topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// How long to wait for the broker's CONNACK, in seconds.
    pub connect_timeout_secs: u16,
    /// Optional username. Authentication is only sent when this is set.
    pub username: Option<String>,
    /// Optional password, used together with `username`.
    pub password: Option<String>,
    /// Quality of service for published readings (0, 1 or 2).
    pub qos: u8,
    /// Publish readings with the retain flag.
    pub retain: bool,
    /// TLS settings.
    pub tls: TlsConfig,
}

/// TLS settings for the broker connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Connect over TLS.
    pub enabled: bool,
    /// PEM CA bundle. The platform roots are used when unset.
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate for mutual TLS.
    pub client_cert: Option<PathBuf>,
    /// PEM private key matching `client_cert`.
    pub client_key: Option<PathBuf>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "inkbird-mqtt".to_string(),
            topic: "/test/sensor/pool".to_string(),
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
            username: None,
            password: None,
            qos: 0,
            retain: false,
            tls: TlsConfig::default(),
        }
    }
}
