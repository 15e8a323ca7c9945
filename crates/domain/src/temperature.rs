//! Decoded temperature values.

use std::fmt;

/// A temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    #[must_use]
    pub const fn from_celsius(celsius: f64) -> Self {
        Self(celsius)
    }

    #[must_use]
    pub const fn celsius(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn fahrenheit(self) -> f64 {
        9.0 / 5.0 * self.0 + 32.0
    }

    /// Render the Celsius value as an MQTT payload.
    ///
    /// Uses the shortest decimal that round-trips, always keeping one
    /// fractional digit (`1.0`, `-1.0`, `23.45`).
    #[must_use]
    pub fn to_payload(self) -> String {
        format_decimal(self.0)
    }

    /// Render the Fahrenheit value as an MQTT payload.
    #[must_use]
    pub fn to_fahrenheit_payload(self) -> String {
        format_decimal(self.fahrenheit())
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} °C", self.0)
    }
}

fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
