// Byte-level layout of a full frame

use super::error::{FrameError, Result};
use crate::bitwise::elements::MAX_WORD_BYTES;
use crate::bitwise::TAG_REGION_BYTES;
use serde::Serialize;
use std::fmt;

/// Layout of one frame: `frame_word_count` big-endian words followed by the tag region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameGeometry {
    word_size_bits: u32,
    word_size_bytes: usize,
    frame_word_count: usize,
}

impl FrameGeometry {
    /// Derive the frame layout from the word width and word count
    pub fn new(word_size_bits: u32, frame_word_count: usize) -> Result<Self> {
        if word_size_bits == 0 {
            return Err(FrameError::InvalidGeometry(
                "word size must be at least 1 bit".to_string(),
            ));
        }
        if frame_word_count == 0 {
            return Err(FrameError::InvalidGeometry(
                "frame must contain at least one word".to_string(),
            ));
        }

        let word_size_bytes = (word_size_bits as usize + 7) / 8;
        if word_size_bytes > MAX_WORD_BYTES {
            return Err(FrameError::InvalidGeometry(format!(
                "word size of {} bits exceeds the {}-bit maximum",
                word_size_bits,
                MAX_WORD_BYTES * 8
            )));
        }

        Ok(Self {
            word_size_bits,
            word_size_bytes,
            frame_word_count,
        })
    }

    pub fn word_size_bits(&self) -> u32 {
        self.word_size_bits
    }

    /// Bytes occupied by one word (bit width rounded up)
    pub fn word_size_bytes(&self) -> usize {
        self.word_size_bytes
    }

    pub fn frame_word_count(&self) -> usize {
        self.frame_word_count
    }

    pub fn data_region_bytes(&self) -> usize {
        self.frame_word_count * self.word_size_bytes
    }

    pub fn tag_region_bytes(&self) -> usize {
        TAG_REGION_BYTES
    }

    /// Total size of one frame on disk
    pub fn frame_size_bytes(&self) -> usize {
        self.data_region_bytes() + TAG_REGION_BYTES
    }

    /// Number of complete frames in a source of `total_bytes`
    pub fn complete_frames(&self, total_bytes: u64) -> u64 {
        total_bytes / self.frame_size_bytes() as u64
    }
}

impl fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} words x {} bits ({} bytes/frame)",
            self.frame_word_count,
            self.word_size_bits,
            self.frame_size_bytes()
        )
    }
}
