// Word selection: parsing word lists and resolving defaults

use crate::frame::{FrameError, FrameGeometry, Result};

lazy_static::lazy_static! {
    // "7" or "3-9", surrounding whitespace allowed
    static ref WORD_TERM: regex::Regex =
        regex::Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").unwrap();
}

/// Parse a word list such as `"1-4,7,7"` into 1-based indices.
/// Ranges expand in either direction ("4-1" gives 4,3,2,1) and
/// duplicates are kept.
pub fn parse_word_list(list: &str) -> Result<Vec<usize>> {
    let mut words = Vec::new();

    for term in list.split(',') {
        let caps = WORD_TERM.captures(term).ok_or_else(|| {
            FrameError::InvalidOptions(format!("invalid word list term: {:?}", term.trim()))
        })?;

        let start = parse_index(&caps[1])?;
        match caps.get(2) {
            None => words.push(start),
            Some(end) => {
                let end = parse_index(end.as_str())?;
                if start <= end {
                    words.extend(start..=end);
                } else {
                    words.extend((end..=start).rev());
                }
            }
        }
    }

    Ok(words)
}

fn parse_index(digits: &str) -> Result<usize> {
    digits
        .parse()
        .map_err(|_| FrameError::InvalidOptions(format!("word index too large: {}", digits)))
}

/// Resolve the requested words against a geometry: all words in frame order
/// when unset, otherwise the request as given after bounds checking.
pub fn resolve_words(requested: Option<&[usize]>, geometry: &FrameGeometry) -> Result<Vec<usize>> {
    let word_count = geometry.frame_word_count();
    match requested {
        None => Ok((1..=word_count).collect()),
        Some([]) => Err(FrameError::InvalidOptions(
            "word list must not be empty".to_string(),
        )),
        Some(words) => {
            if let Some(&index) = words.iter().find(|&&w| w == 0 || w > word_count) {
                return Err(FrameError::IndexOutOfRange { index, word_count });
            }
            Ok(words.to_vec())
        }
    }
}
