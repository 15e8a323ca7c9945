//! # inkbird-adapter-ble
//!
//! Active BLE adapter — connects to an Inkbird pool thermometer and reads
//! its temperature characteristic over GATT.
//!
//! ## How it works
//!
//! Each read:
//! 1. selects the configured host adapter (cached until an adapter-level
//!    failure, then reopened)
//! 2. looks the sensor up by MAC address, scanning when it is not yet known
//! 3. connects, reads the characteristic and disconnects
//!
//! The whole GATT exchange is bounded by `connect_timeout_secs`. Failures are
//! returned to the poll loop, which retries immediately.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `inkbird-app` and `inkbird-domain`.

mod config;
mod error;
mod gatt;
mod scanner;

pub use config::{BleConfig, DEFAULT_CHARACTERISTIC};
pub use error::BleError;

use std::time::Duration;

use btleplug::api::{BDAddr, Manager as _};
use btleplug::platform::{Adapter, Manager};

use inkbird_app::ports::SensorReader;
use inkbird_domain::error::BridgeError;

/// [`SensorReader`] backed by a btleplug GATT read.
pub struct BleSensor {
    config: BleConfig,
    address: BDAddr,
    /// Selected host adapter, kept alive together with its manager.
    central: Option<(Manager, Adapter)>,
}

impl BleSensor {
    /// Create a sensor reader for the configured address.
    ///
    /// No Bluetooth IO happens until the first read.
    ///
    /// # Errors
    ///
    /// Returns [`BleError::InvalidAddress`] when `config.address` is not a
    /// MAC address.
    pub fn new(config: BleConfig) -> Result<Self, BleError> {
        let address = scanner::parse_address(&config.address)?;
        Ok(Self {
            config,
            address,
            central: None,
        })
    }

    /// Address of the sensor this reader talks to.
    #[must_use]
    pub fn address(&self) -> BDAddr {
        self.address
    }

    async fn central(&mut self) -> Result<Adapter, BleError> {
        if let Some((_, adapter)) = &self.central {
            return Ok(adapter.clone());
        }

        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = scanner::select_adapter(adapters, &self.config.adapter).await?;

        self.central = Some((manager, adapter.clone()));
        Ok(adapter)
    }

    fn forget_adapter(&mut self, err: &BleError) {
        if err.invalidates_adapter() && self.central.take().is_some() {
            tracing::debug!(%err, "dropping cached BLE adapter");
        }
    }

    async fn read(&mut self) -> Result<Vec<u8>, BleError> {
        let central = self.central().await?;
        let scan_timeout = Duration::from_secs(u64::from(self.config.scan_timeout_secs));
        let peripheral = scanner::find_peripheral(&central, self.address, scan_timeout).await?;

        tracing::debug!(address = %self.address, "reading sensor via GATT");

        let secs = self.config.connect_timeout_secs;
        let result = tokio::time::timeout(
            Duration::from_secs(u64::from(secs)),
            gatt::read_characteristic(&peripheral, self.config.characteristic),
        )
        .await;

        match result {
            Ok(read) => read,
            Err(_) => {
                gatt::disconnect(&peripheral).await;
                Err(BleError::Timeout { secs })
            }
        }
    }
}

impl SensorReader for BleSensor {
    async fn read_sample(&mut self) -> Result<Vec<u8>, BridgeError> {
        let result = self.read().await;
        if let Err(err) = &result {
            self.forget_adapter(err);
        }
        result.map_err(BleError::into_domain)
    }
}
