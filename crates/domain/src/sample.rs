//! Raw sensor samples and the temperature decoder.
//!
//! The first two bytes of the sensor characteristic hold the current
//! temperature in hundredths of a degree Celsius, little-endian.
//!
//! | Bytes | Type | Field |
//! |-------|------|-------|
//! | 0 | u8 | Low byte |
//! | 1 | u8 | High byte (`0xFF` marks a negative reading) |
//! | 2.. | — | Ignored |
//!
//! Only a high byte of exactly `0xFF` is treated as negative. Readings whose
//! high byte falls in `0x80..=0xFE` decode as large positive values; the
//! sensor's documented range never produces them.

use crate::error::DecodeError;
use crate::temperature::Temperature;

/// Number of bytes that make up one sample.
pub const SAMPLE_LEN: usize = 2;

const SCALE: f64 = 100.0;

/// Two raw bytes read from the sensor characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    low: u8,
    high: u8,
}

impl Sample {
    /// Build a sample from its low and high bytes.
    #[must_use]
    pub const fn new(low: u8, high: u8) -> Self {
        Self { low, high }
    }

    /// Take the first two bytes of a characteristic value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TooShort`] when fewer than two bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        match bytes {
            [low, high, ..] => Ok(Self::new(*low, *high)),
            _ => Err(DecodeError::TooShort {
                expected: SAMPLE_LEN,
                actual: bytes.len(),
            }),
        }
    }

    /// The little-endian 16-bit value `(high << 8) | low`.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        u16::from_le_bytes([self.low, self.high])
    }

    /// Whether the sample encodes a negative reading.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.high == 0xFF
    }

    /// Signed hundredths of a degree Celsius.
    #[must_use]
    pub fn centidegrees(&self) -> i32 {
        let value = i32::from(self.raw());
        if self.is_negative() {
            -((value ^ 0xFFFF) + 1)
        } else {
            value
        }
    }

    /// Decode into degrees Celsius.
    #[must_use]
    pub fn decode(&self) -> Temperature {
        Temperature::from_celsius(f64::from(self.centidegrees()) / SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_positive_reading() {
        let sample = Sample::from_bytes(&[0x64, 0x00]).unwrap();
        assert_eq!(sample.raw(), 100);
        assert!(!sample.is_negative());
        assert!((sample.decode().celsius() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_decode_negative_reading() {
        let sample = Sample::from_bytes(&[0x9C, 0xFF]).unwrap();
        assert_eq!(sample.raw(), 0xFF9C);
        assert!(sample.is_negative());
        assert_eq!(sample.centidegrees(), -100);
        assert!((sample.decode().celsius() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_decode_typical_pool_temperature() {
        // 2345 = 0x0929
        let sample = Sample::new(0x29, 0x09);
        assert_eq!(sample.centidegrees(), 2345);
        assert!((sample.decode().celsius() - 23.45).abs() < 1e-9);
    }

    #[test]
    fn should_decode_zero() {
        let sample = Sample::new(0x00, 0x00);
        assert_eq!(sample.centidegrees(), 0);
        assert_eq!(sample.decode().to_payload(), "0.0");
    }

    #[test]
    fn should_decode_lowest_negative_high_byte_value() {
        // 0xFF00 -> -(0x00FF + 1) = -256
        let sample = Sample::new(0x00, 0xFF);
        assert_eq!(sample.centidegrees(), -256);
    }

    #[test]
    fn should_decode_minus_one_hundredth() {
        let sample = Sample::new(0xFF, 0xFF);
        assert_eq!(sample.centidegrees(), -1);
        assert_eq!(sample.decode().to_payload(), "-0.01");
    }

    #[test]
    fn should_treat_high_bytes_below_ff_as_non_negative() {
        for high in 0x00..0xFF_u8 {
            for low in [0x00, 0x01, 0x7F, 0x80, 0xFF] {
                let sample = Sample::new(low, high);
                let expected = f64::from((u32::from(high) << 8) | u32::from(low)) / 100.0;
                let celsius = sample.decode().celsius();
                assert!(celsius >= 0.0, "high={high:#04x} low={low:#04x}");
                assert!((celsius - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn should_treat_ff_high_byte_as_negative() {
        for low in 0x00..=0xFF_u8 {
            let sample = Sample::new(low, 0xFF);
            let value = (0xFF_i32 << 8) | i32::from(low);
            let expected = f64::from(-((value ^ 0xFFFF) + 1)) / 100.0;
            let celsius = sample.decode().celsius();
            assert!(celsius < 0.0, "low={low:#04x}");
            assert!((celsius - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn should_ignore_trailing_bytes() {
        let sample = Sample::from_bytes(&[0x64, 0x00, 0x12, 0x34, 0x56]).unwrap();
        assert_eq!(sample, Sample::new(0x64, 0x00));
    }

    #[test]
    fn should_reject_short_buffer() {
        let err = Sample::from_bytes(&[0x64]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn should_reject_empty_buffer() {
        assert!(Sample::from_bytes(&[]).is_err());
    }
}
