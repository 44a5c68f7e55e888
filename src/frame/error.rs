// Error taxonomy for the frame decoding pipeline

use crate::bitwise::{BcdError, ElementError};
use crate::formats::hex::HexError;
use crate::formats::sink::SinkError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid frame geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid frame range: {0}")]
    InvalidRange(String),

    #[error("Word index {index} out of range 1..={word_count}")]
    IndexOutOfRange { index: usize, word_count: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed time field in frame {frame}: {source}")]
    MalformedTimeField { frame: u64, source: BcdError },

    #[error("Value {value:#x} does not fit in {element_size_bytes} byte(s)")]
    ValueOverflow {
        value: u64,
        element_size_bytes: usize,
    },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Decode cancelled after {frames_read} frames")]
    Cancelled { frames_read: usize },
}

impl From<ElementError> for FrameError {
    fn from(err: ElementError) -> Self {
        match err {
            ElementError::IndexOutOfRange { index, word_count } => {
                FrameError::IndexOutOfRange { index, word_count }
            }
            ElementError::UnsupportedWidth(width) => {
                FrameError::InvalidGeometry(format!("unsupported word width of {} bytes", width))
            }
            other => FrameError::InvalidGeometry(other.to_string()),
        }
    }
}

impl From<HexError> for FrameError {
    fn from(err: HexError) -> Self {
        match err {
            HexError::ValueOverflow {
                value,
                element_size_bytes,
            } => FrameError::ValueOverflow {
                value,
                element_size_bytes,
            },
            HexError::InvalidElementSize(size) => {
                FrameError::InvalidOptions(format!("invalid hex element size: {}", size))
            }
            HexError::Sink(e) => e.into(),
        }
    }
}

impl From<SinkError> for FrameError {
    fn from(err: SinkError) -> Self {
        match err {
            SinkError::Io(e) => FrameError::Io(e),
            SinkError::Closed => FrameError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "write to closed sink",
            )),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
