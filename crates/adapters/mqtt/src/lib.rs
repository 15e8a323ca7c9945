//! # inkbird-adapter-mqtt
//!
//! MQTT adapter — publishes readings to a broker via rumqttc.
//!
//! ## Responsibilities
//! - Build client options (keep-alive, credentials, TLS)
//! - Connect and wait for the broker's CONNACK before returning
//! - Drive the event loop in a background task (keep-alive, reconnects)
//! - Publish payloads and disconnect cleanly
//!
//! ## Dependency rule
//! Same as other adapters: depends on `inkbird-app` and `inkbird-domain`.

mod config;
mod error;
pub mod options;

pub use config::{MqttConfig, TlsConfig};
pub use error::MqttError;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnAck, ConnectReturnCode, ConnectionError, Event, EventLoop, Outgoing, Packet,
    QoS,
};
use tokio::task::JoinHandle;

use inkbird_app::ports::Publisher;
use inkbird_domain::error::BridgeError;

/// Capacity of the request channel between client and event loop.
const CHANNEL_CAPACITY: usize = 16;

/// Pause before the event loop retries after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// How long `disconnect` waits for the event loop to flush DISCONNECT.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// [`Publisher`] backed by a connected rumqttc client.
///
/// Requests never wait on the event loop: while the broker connection is
/// down, publishing fails with [`MqttError::NotConnected`], and a full
/// request channel fails with [`MqttError::Client`].
pub struct MqttPublisher {
    client: AsyncClient,
    qos: QoS,
    retain: bool,
    /// Set on CONNACK, cleared on connection errors by the event loop task.
    online: Arc<AtomicBool>,
    event_loop: Option<JoinHandle<()>>,
}

impl MqttPublisher {
    /// Connect to the configured broker.
    ///
    /// Returns once the broker accepted the connection; the event loop then
    /// keeps running in a background task.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Refused`] when the broker rejects the
    /// connection, [`MqttError::Connection`] on network or TLS failure,
    /// [`MqttError::ConnectTimeout`] when no CONNACK arrives in time, or a
    /// configuration error from [`options::build`].
    pub async fn connect(config: &MqttConfig) -> Result<Self, MqttError> {
        let qos = options::qos(config.qos)?;
        let mqtt_options = options::build(config)?;
        let (client, mut event_loop) = AsyncClient::new(mqtt_options, CHANNEL_CAPACITY);

        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            tls = config.tls.enabled,
            "connecting to MQTT broker"
        );

        let secs = config.connect_timeout_secs;
        let ack = tokio::time::timeout(
            Duration::from_secs(u64::from(secs)),
            wait_for_connack(&mut event_loop),
        )
        .await
        .map_err(|_| MqttError::ConnectTimeout { secs })??;

        if ack.code != ConnectReturnCode::Success {
            return Err(MqttError::Refused { code: ack.code });
        }

        tracing::info!("MQTT connection established");

        let online = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(drive_event_loop(event_loop, Arc::clone(&online)));

        Ok(Self {
            client,
            qos,
            retain: config.retain,
            online,
            event_loop: Some(task),
        })
    }

    /// Whether the broker connection is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.event_loop.is_some() && self.online.load(Ordering::Acquire)
    }

    fn send(&self, topic: &str, payload: String) -> Result<(), MqttError> {
        if !self.is_connected() {
            return Err(MqttError::NotConnected);
        }
        self.client
            .try_publish(topic, self.qos, self.retain, payload)
            .map_err(MqttError::Client)
    }

    async fn close(&mut self) -> Result<(), MqttError> {
        let Some(handle) = self.event_loop.take() else {
            return Ok(());
        };

        if !self.online.swap(false, Ordering::AcqRel) {
            handle.abort();
            tracing::warn!("MQTT broker unreachable, dropping connection");
            return Err(MqttError::NotConnected);
        }

        if let Err(err) = self.client.try_disconnect() {
            handle.abort();
            return Err(MqttError::Client(err));
        }

        let abort = handle.abort_handle();
        if tokio::time::timeout(DISCONNECT_TIMEOUT, handle).await.is_err() {
            tracing::warn!("MQTT event loop did not stop in time, aborting");
            abort.abort();
        }

        tracing::info!("MQTT disconnected");
        Ok(())
    }
}

impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BridgeError> {
        self.send(topic, payload).map_err(MqttError::into_domain)
    }

    async fn disconnect(&mut self) -> Result<(), BridgeError> {
        self.close().await.map_err(MqttError::into_domain)
    }
}

impl Drop for MqttPublisher {
    fn drop(&mut self) {
        if let Some(handle) = self.event_loop.take() {
            handle.abort();
        }
    }
}

/// Poll the event loop until the broker answers the CONNECT.
async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<ConnAck, MqttError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => return Ok(ack),
            Ok(event) => tracing::trace!(?event, "MQTT event before CONNACK"),
            Err(ConnectionError::ConnectionRefused(code)) => {
                return Err(MqttError::Refused { code });
            }
            Err(err) => return Err(MqttError::Connection(err)),
        }
    }
}

/// Background task: keeps the connection alive until DISCONNECT is sent.
async fn drive_event_loop(mut event_loop: EventLoop, online: Arc<AtomicBool>) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("MQTT DISCONNECT sent");
                break;
            }
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                let accepted = ack.code == ConnectReturnCode::Success;
                online.store(accepted, Ordering::Release);
                if accepted {
                    tracing::info!("MQTT connection re-established");
                } else {
                    tracing::warn!(code = ?ack.code, "MQTT reconnect refused");
                }
            }
            Ok(event) => tracing::trace!(?event, "MQTT event"),
            Err(err) => {
                online.store(false, Ordering::Release);
                tracing::warn!(%err, "MQTT connection error, reconnecting");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
