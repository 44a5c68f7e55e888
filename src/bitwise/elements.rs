// Big-endian word extraction from a frame's data region

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Word index {index} out of range 1..={word_count}")]
    IndexOutOfRange { index: usize, word_count: usize },

    #[error("Unsupported word width: {0} bytes")]
    UnsupportedWidth(usize),
}

pub type Result<T> = std::result::Result<T, ElementError>;

/// Widest word that fits the value type without loss
pub const MAX_WORD_BYTES: usize = std::mem::size_of::<u64>();

/// Read an unsigned big-endian integer of `width` bytes from the front of `data`.
/// No sign extension is applied.
/// Example: [0x12, 0x34, 0x56], width 3 -> 0x123456
pub fn read_uint_be(data: &[u8], width: usize) -> Result<u64> {
    if width == 0 || width > MAX_WORD_BYTES {
        return Err(ElementError::UnsupportedWidth(width));
    }
    if data.len() < width {
        return Err(ElementError::InsufficientData {
            expected: width,
            actual: data.len(),
        });
    }

    Ok(data[..width]
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | byte as u64))
}

/// Check that every 1-based index addresses a word in a region of `word_count` words
pub fn check_word_indices(indices: &[usize], word_count: usize) -> Result<()> {
    match indices.iter().find(|&&w| w == 0 || w > word_count) {
        Some(&index) => Err(ElementError::IndexOutOfRange { index, word_count }),
        None => Ok(()),
    }
}

/// Extract the requested 1-based words from a data region into `out`.
///
/// `out` must hold exactly one slot per requested index; values land in
/// request order, duplicates included.
pub fn extract_words_into(
    data_region: &[u8],
    indices: &[usize],
    word_size_bytes: usize,
    out: &mut [u64],
) -> Result<()> {
    if word_size_bytes == 0 || word_size_bytes > MAX_WORD_BYTES {
        return Err(ElementError::UnsupportedWidth(word_size_bytes));
    }
    if out.len() != indices.len() {
        return Err(ElementError::InsufficientData {
            expected: indices.len(),
            actual: out.len(),
        });
    }

    let word_count = data_region.len() / word_size_bytes;
    check_word_indices(indices, word_count)?;

    for (slot, &w) in out.iter_mut().zip(indices) {
        let start = (w - 1) * word_size_bytes;
        *slot = read_uint_be(&data_region[start..], word_size_bytes)?;
    }

    Ok(())
}

/// Extract the requested 1-based words from a data region
pub fn extract_words(
    data_region: &[u8],
    indices: &[usize],
    word_size_bytes: usize,
) -> Result<Vec<u64>> {
    let mut values = vec![0u64; indices.len()];
    extract_words_into(data_region, indices, word_size_bytes, &mut values)?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_uint_be_widths() {
        assert_eq!(read_uint_be(&[0xAB], 1).unwrap(), 0xAB);
        assert_eq!(read_uint_be(&[0x12, 0x34], 2).unwrap(), 0x1234);
        assert_eq!(read_uint_be(&[0x12, 0x34, 0x56], 3).unwrap(), 0x123456);
        assert_eq!(
            read_uint_be(&[0xFF; 8], 8).unwrap(),
            u64::MAX,
            "full-width words must not lose precision"
        );
    }

    #[test]
    fn test_no_sign_extension() {
        assert_eq!(read_uint_be(&[0xFF, 0xFE], 2).unwrap(), 0xFFFE);
        assert_eq!(read_uint_be(&[0x80, 0x00, 0x00], 3).unwrap(), 0x800000);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(read_uint_be(&[0x12], 2).is_err());
        assert!(read_uint_be(&[0x12; 9], 9).is_err());
        assert!(read_uint_be(&[0x12], 0).is_err());
    }

    #[test]
    fn test_extract_preserves_order_and_duplicates() {
        let data = [0x00, 0x01, 0x00, 0x02];
        assert_eq!(extract_words(&data, &[1, 2], 2).unwrap(), vec![1, 2]);
        assert_eq!(extract_words(&data, &[2, 2, 1], 2).unwrap(), vec![2, 2, 1]);
    }

    #[test]
    fn test_extract_out_of_range() {
        let data = [0x00, 0x01, 0x00, 0x02];
        assert_eq!(
            extract_words(&data, &[3], 2).unwrap_err(),
            ElementError::IndexOutOfRange {
                index: 3,
                word_count: 2
            }
        );
        assert!(extract_words(&data, &[0], 2).is_err());
    }

    #[test]
    fn test_extract_odd_width() {
        // Two 12-bit words stored in 2 bytes each
        let data = [0x0F, 0xFF, 0x0A, 0xBC];
        assert_eq!(extract_words(&data, &[1, 2], 2).unwrap(), vec![0x0FFF, 0x0ABC]);
    }
}
