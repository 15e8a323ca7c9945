//! # inkbird-domain
//!
//! Pure domain model for the Inkbird BLE-to-MQTT bridge.
//!
//! ## Responsibilities
//! - Define the raw **Sample** read from the sensor characteristic
//! - Decode samples into a **Temperature** (degrees Celsius)
//! - Render temperatures as MQTT payloads
//! - Define the error taxonomy shared by the ports
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod sample;
pub mod temperature;
