//! BLE sensor configuration.

use serde::Deserialize;

/// Characteristic holding the live reading (GATT handle `0x0024` on the
/// IBS-P01B / IBS-TH1 family).
pub const DEFAULT_CHARACTERISTIC: uuid::Uuid =
    uuid::Uuid::from_u128(0x0000_fff2_0000_1000_8000_0080_5f9b_34fb);

/// Configuration for the BLE sensor reader.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// MAC address of the sensor (e.g. `"49:42:08:00:12:34"`).
    pub address: String,
    /// Host adapter name. Falls back to the first adapter when no adapter
    /// with this name exists.
    pub adapter: String,
    /// UUID of the characteristic carrying the temperature.
    pub characteristic: uuid::Uuid,
    /// How long to scan for the sensor when it is not already known, in seconds.
    pub scan_timeout_secs: u16,
    /// Upper bound for connect + read + disconnect, in seconds.
    pub connect_timeout_secs: u16,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            adapter: "hci0".to_string(),
            characteristic: DEFAULT_CHARACTERISTIC,
            scan_timeout_secs: 10,
            connect_timeout_secs: 20,
        }
    }
}
