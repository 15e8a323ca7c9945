//! MQTT adapter error types.

use std::path::PathBuf;

use inkbird_domain::error::BridgeError;
use rumqttc::ConnectReturnCode;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request (request channel closed or full).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The broker connection is down; the event loop is reconnecting.
    #[error("not connected to MQTT broker")]
    NotConnected,

    /// The connection to the broker failed.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),

    /// The broker answered CONNACK with a non-success code.
    #[error("MQTT connection refused: {code:?}")]
    Refused {
        /// Return code sent by the broker.
        code: ConnectReturnCode,
    },

    /// No CONNACK within the connect timeout.
    #[error("no CONNACK from broker after {secs}s")]
    ConnectTimeout {
        /// Timeout that elapsed.
        secs: u16,
    },

    /// QoS outside `0..=2`.
    #[error("invalid QoS level {0}")]
    InvalidQos(u8),

    /// A TLS certificate or key file could not be read.
    #[error("failed to read TLS file {path}")]
    Certificate {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Only one of client certificate and client key was configured.
    #[error("client certificate and client key must be set together")]
    IncompleteClientAuth,

    /// Client authentication needs an explicit CA bundle.
    #[error("client certificate authentication requires a CA certificate")]
    MissingCaCert,
}

impl MqttError {
    /// Convert into a [`BridgeError::Messaging`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        BridgeError::Messaging(Box::new(self))
    }
}
