//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`BridgeError`] at the port boundary. Adapter errors are boxed so the
//! domain stays free of IO crates.

/// Boxed adapter error carried across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors crossing the sensor and messaging ports.
///
/// Every variant is recoverable from the poll loop's point of view; which
/// failures end the process is decided by the caller.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The sensor returned a value that is not a sample.
    #[error("failed to decode sensor sample")]
    Decode(#[from] DecodeError),

    /// The sensor transport failed (adapter, connection, GATT read).
    #[error("sensor transport error")]
    Sensor(#[source] BoxError),

    /// The messaging transport failed (connect, publish, disconnect).
    #[error("messaging transport error")]
    Messaging(#[source] BoxError),
}

/// Details about why raw bytes could not be turned into a sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than a sample needs.
    #[error("sample must be at least {expected} bytes, got {actual}")]
    TooShort {
        /// Bytes required.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },
}
