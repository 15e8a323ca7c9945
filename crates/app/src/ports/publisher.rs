//! Publisher port — outbound messages to the broker.

use std::future::Future;

use inkbird_domain::error::BridgeError;

/// Publishes payloads to a message broker over an established connection.
pub trait Publisher {
    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Close the broker connection. Calling it twice is not an error.
    fn disconnect(&mut self) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
