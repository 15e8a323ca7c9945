//! Sensor port — one-shot reads of the temperature characteristic.

use std::future::Future;

use inkbird_domain::error::BridgeError;

/// Reads the raw characteristic value from a sensor.
///
/// Each call connects to the device, reads once and releases the
/// connection. Implementations do not retry; the poll loop does.
pub trait SensorReader {
    /// Read the current characteristic value.
    ///
    /// The returned buffer carries the sample in its first two bytes; any
    /// trailing bytes are ignored by the decoder.
    fn read_sample(&mut self) -> impl Future<Output = Result<Vec<u8>, BridgeError>> + Send;
}
