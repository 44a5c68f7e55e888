// Binary-Coded Decimal (BCD) decoding for the frame time tag

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BcdError {
    #[error("Invalid BCD digit {value:#x} at nibble {position}")]
    InvalidNibble { position: usize, value: u8 },
}

pub type Result<T> = std::result::Result<T, BcdError>;

/// Number of bytes in the packed time field of a tag region
pub const TIME_FIELD_BYTES: usize = 6;

/// Weight of each time nibble in microseconds, high nibble first, byte 0 first.
/// HH MM SS . ffffff
const TIME_NIBBLE_WEIGHTS_US: [u64; 2 * TIME_FIELD_BYTES] = [
    36_000_000_000,
    3_600_000_000,
    600_000_000,
    60_000_000,
    10_000_000,
    1_000_000,
    100_000,
    10_000,
    1_000,
    100,
    10,
    1,
];

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Split a byte into its (high, low) nibbles without validating them
/// Example: 0x12 -> (1, 2), 0xAB -> (10, 11)
pub fn nibbles(byte: u8) -> (u8, u8) {
    ((byte & 0xF0) >> 4, byte & 0x0F)
}

/// Decode the packed BCD time field into microseconds of day.
///
/// Nibbles are consumed in byte order, high nibble before low nibble, and
/// each must be a decimal digit. Integer accumulation keeps the sub-second
/// digits exact.
pub fn decode_time_of_day_micros(field: &[u8; TIME_FIELD_BYTES]) -> Result<u64> {
    let mut micros: u64 = 0;

    for (byte_idx, &byte) in field.iter().enumerate() {
        let (high, low) = nibbles(byte);
        for (half, digit) in [high, low].into_iter().enumerate() {
            let position = byte_idx * 2 + half;
            if digit > 9 {
                return Err(BcdError::InvalidNibble {
                    position,
                    value: digit,
                });
            }
            micros += digit as u64 * TIME_NIBBLE_WEIGHTS_US[position];
        }
    }

    Ok(micros)
}

/// Decode the packed BCD time field into seconds of day
/// Example: [0x12, 0x34, 0x56, 0x00, 0x00, 0x00] -> 45296.0 (12:34:56)
pub fn decode_time_of_day(field: &[u8; TIME_FIELD_BYTES]) -> Result<f64> {
    let micros = decode_time_of_day_micros(field)?;
    Ok(micros as f64 / MICROS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles() {
        assert_eq!(nibbles(0x12), (1, 2));
        assert_eq!(nibbles(0xAB), (10, 11));
    }

    #[test]
    fn test_midnight() {
        assert_eq!(decode_time_of_day(&[0; 6]).unwrap(), 0.0);
    }

    #[test]
    fn test_last_microsecond_of_day() {
        let t = decode_time_of_day(&[0x23, 0x59, 0x59, 0x99, 0x99, 0x99]).unwrap();
        assert_eq!(t, 86399.999999);
        assert_eq!(
            decode_time_of_day_micros(&[0x23, 0x59, 0x59, 0x99, 0x99, 0x99]).unwrap(),
            86_399_999_999
        );
    }

    #[test]
    fn test_hours_minutes_seconds() {
        // 12:34:56.000000
        let t = decode_time_of_day(&[0x12, 0x34, 0x56, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(t, 45296.0);

        // 00:00:00.5
        let t = decode_time_of_day(&[0x00, 0x00, 0x00, 0x50, 0x00, 0x00]).unwrap();
        assert_eq!(t, 0.5);
    }

    #[test]
    fn test_malformed_nibble_reports_position() {
        let err = decode_time_of_day(&[0x00, 0x00, 0x00, 0x0C, 0x00, 0x00]).unwrap_err();
        assert_eq!(
            err,
            BcdError::InvalidNibble {
                position: 7,
                value: 0xC
            }
        );

        let err = decode_time_of_day(&[0xA0, 0x00, 0x00, 0x00, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err, BcdError::InvalidNibble { position: 0, .. }));
    }
}
