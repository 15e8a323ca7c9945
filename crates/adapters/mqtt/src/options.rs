//! Translation of [`MqttConfig`] into rumqttc client options.

use std::path::Path;
use std::time::Duration;

use rumqttc::{MqttOptions, QoS, Transport};

use crate::config::{MqttConfig, TlsConfig};
use crate::error::MqttError;

/// Map a numeric QoS level onto rumqttc's enum.
///
/// # Errors
///
/// Returns [`MqttError::InvalidQos`] for levels above 2.
pub fn qos(level: u8) -> Result<QoS, MqttError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(MqttError::InvalidQos(other)),
    }
}

/// Build client options: identity, keep-alive, credentials and transport.
///
/// A username without a password authenticates with an empty password.
///
/// # Errors
///
/// Returns an error when TLS is enabled and its files cannot be read or are
/// inconsistent.
pub fn build(config: &MqttConfig) -> Result<MqttOptions, MqttError> {
    let mut options = MqttOptions::new(
        config.client_id.as_str(),
        config.broker_host.as_str(),
        config.broker_port,
    );
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));

    if let Some(username) = &config.username {
        options.set_credentials(
            username.as_str(),
            config.password.clone().unwrap_or_default(),
        );
    }

    if config.tls.enabled {
        options.set_transport(transport(&config.tls)?);
    }

    Ok(options)
}

fn transport(tls: &TlsConfig) -> Result<Transport, MqttError> {
    let client_auth = match (&tls.client_cert, &tls.client_key) {
        (Some(cert), Some(key)) => Some((read_pem(cert)?, read_pem(key)?)),
        (None, None) => None,
        _ => return Err(MqttError::IncompleteClientAuth),
    };

    match (&tls.ca_cert, client_auth) {
        (Some(ca), client_auth) => Ok(Transport::tls(read_pem(ca)?, client_auth, None)),
        (None, None) => Ok(Transport::tls_with_default_config()),
        (None, Some(_)) => Err(MqttError::MissingCaCert),
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, MqttError> {
    std::fs::read(path).map_err(|source| MqttError::Certificate {
        path: path.to_path_buf(),
        source,
    })
}
