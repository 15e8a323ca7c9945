//! GATT connection helpers for active sensor readout.
//!
//! Provides [`read_characteristic`] which connects to a peripheral, reads
//! one characteristic and always disconnects, even on error.

use btleplug::api::{Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;

use crate::error::BleError;

/// Find a GATT characteristic by UUID on a peripheral that has already
/// discovered its services.
///
/// # Errors
///
/// Returns [`BleError::CharacteristicNotFound`] if no characteristic with
/// the given UUID is present.
fn find_characteristic(
    peripheral: &Peripheral,
    uuid: uuid::Uuid,
) -> Result<Characteristic, BleError> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or(BleError::CharacteristicNotFound { uuid })
}

/// Connect to the sensor, read the characteristic `uuid` and return its
/// value.
///
/// The connection is always closed on return, even if the read fails. The
/// caller is responsible for applying a timeout around this function.
///
/// # Errors
///
/// Returns [`BleError::GattConnect`] if the connection fails,
/// [`BleError::CharacteristicNotFound`] if the characteristic is missing, or
/// [`BleError::Scan`] for discovery/read failures.
pub async fn read_characteristic(
    peripheral: &Peripheral,
    uuid: uuid::Uuid,
) -> Result<Vec<u8>, BleError> {
    peripheral.connect().await.map_err(BleError::GattConnect)?;

    let result = read_inner(peripheral, uuid).await;

    disconnect(peripheral).await;

    result
}

/// Best-effort disconnect; failures are only logged.
pub async fn disconnect(peripheral: &Peripheral) {
    if let Err(err) = peripheral.disconnect().await {
        tracing::warn!(%err, "failed to disconnect sensor peripheral");
    }
}

/// Inner read logic, separated so the caller can always disconnect.
async fn read_inner(peripheral: &Peripheral, uuid: uuid::Uuid) -> Result<Vec<u8>, BleError> {
    peripheral.discover_services().await?;

    let characteristic = find_characteristic(peripheral, uuid)?;
    let value = peripheral.read(&characteristic).await?;

    tracing::trace!(%uuid, len = value.len(), "characteristic read");
    Ok(value)
}
