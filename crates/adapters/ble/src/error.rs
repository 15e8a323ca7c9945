//! BLE adapter error types.

use btleplug::api::{BDAddr, ParseBDAddrError};
use inkbird_domain::error::BridgeError;

/// Errors specific to the BLE adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// The configured sensor address is not a MAC address.
    #[error("invalid sensor address {address:?}")]
    InvalidAddress {
        /// The configured value.
        address: String,
        /// Parser failure.
        #[source]
        source: ParseBDAddrError,
    },

    /// BLE scan or adapter operation failed.
    #[error("BLE scan error")]
    Scan(#[from] btleplug::Error),

    /// Connecting to the peripheral failed.
    #[error("GATT connect failed")]
    GattConnect(#[source] btleplug::Error),

    /// The sensor did not show up during the scan window.
    #[error("sensor {address} not found")]
    PeripheralNotFound {
        /// Address that was searched for.
        address: BDAddr,
    },

    /// The peripheral does not expose the configured characteristic.
    #[error("characteristic {uuid} not found")]
    CharacteristicNotFound {
        /// UUID that was looked up.
        uuid: uuid::Uuid,
    },

    /// The GATT exchange took longer than the connect timeout.
    #[error("GATT read timed out after {secs}s")]
    Timeout {
        /// Timeout that elapsed.
        secs: u16,
    },
}

impl BleError {
    /// Convert into a [`BridgeError::Sensor`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> BridgeError {
        BridgeError::Sensor(Box::new(self))
    }

    /// Whether the cached host adapter should be dropped and reopened on the
    /// next read.
    #[must_use]
    pub fn invalidates_adapter(&self) -> bool {
        matches!(self, Self::NotAvailable | Self::Scan(_))
    }
}
