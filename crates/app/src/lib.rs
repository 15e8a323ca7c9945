//! # inkbird-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SensorReader` — read one raw characteristic value from the sensor
//!   - `Publisher` — publish payloads to the message broker and disconnect
//! - Provide the **poll loop** use-case: read, decode, publish, sleep
//! - Orchestrate domain objects without knowing *how* BLE or MQTT work
//!
//! ## Dependency rule
//! Depends on `inkbird-domain` only (plus `tokio::time` for sleeping).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
