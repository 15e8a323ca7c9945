//! Adapter selection and peripheral lookup.

use std::time::Duration;

use btleplug::api::{BDAddr, Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use tokio_stream::StreamExt as _;

use crate::error::BleError;

/// Parse a `AA:BB:CC:DD:EE:FF` sensor address.
///
/// # Errors
///
/// Returns [`BleError::InvalidAddress`] when the text is not a MAC address.
pub(crate) fn parse_address(address: &str) -> Result<BDAddr, BleError> {
    address
        .trim()
        .parse()
        .map_err(|source| BleError::InvalidAddress {
            address: address.to_owned(),
            source,
        })
}

/// Whether an adapter info string (e.g. `"hci0 (usb:v1D6Bp0246d0537)"`)
/// belongs to the adapter called `name`.
pub(crate) fn adapter_matches(info: &str, name: &str) -> bool {
    info.split_whitespace()
        .next()
        .is_some_and(|first| first.eq_ignore_ascii_case(name))
}

/// Pick the adapter named `name`, or the first one when none matches.
///
/// # Errors
///
/// Returns [`BleError::NotAvailable`] when the host has no adapter at all.
pub(crate) async fn select_adapter(adapters: Vec<Adapter>, name: &str) -> Result<Adapter, BleError> {
    let mut fallback = None;
    for adapter in adapters {
        match adapter.adapter_info().await {
            Ok(info) if adapter_matches(&info, name) => {
                tracing::debug!(%info, "using BLE adapter");
                return Ok(adapter);
            }
            Ok(info) => tracing::trace!(%info, "skipping BLE adapter"),
            Err(err) => tracing::debug!(%err, "failed to query BLE adapter info"),
        }
        if fallback.is_none() {
            fallback = Some(adapter);
        }
    }

    let adapter = fallback.ok_or(BleError::NotAvailable)?;
    tracing::warn!(wanted = %name, "BLE adapter not found, using first available");
    Ok(adapter)
}

/// Return the peripheral with `address`, scanning for up to `timeout` when
/// the adapter does not know it yet.
///
/// # Errors
///
/// Returns [`BleError::PeripheralNotFound`] when the scan window elapses
/// without seeing the sensor, or [`BleError::Scan`] when the scan cannot be
/// started.
pub(crate) async fn find_peripheral(
    central: &Adapter,
    address: BDAddr,
    timeout: Duration,
) -> Result<Peripheral, BleError> {
    if let Some(peripheral) = known_peripheral(central, address).await? {
        return Ok(peripheral);
    }

    let mut events = central.events().await?;
    central.start_scan(ScanFilter::default()).await?;
    tracing::debug!(%address, timeout_secs = timeout.as_secs(), "BLE scan started");

    let deadline = tokio::time::Instant::now() + timeout;
    let mut found = None;

    while found.is_none() {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, events.next()).await {
            Ok(Some(
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id),
            )) => {
                if let Ok(peripheral) = central.peripheral(&id).await {
                    if peripheral.address() == address {
                        found = Some(peripheral);
                    }
                }
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    if let Err(err) = central.stop_scan().await {
        tracing::warn!(%err, "failed to stop BLE scan");
    }

    found.ok_or(BleError::PeripheralNotFound { address })
}

async fn known_peripheral(
    central: &Adapter,
    address: BDAddr,
) -> Result<Option<Peripheral>, BleError> {
    let peripherals = central.peripherals().await?;
    Ok(peripherals.into_iter().find(|p| p.address() == address))
}
