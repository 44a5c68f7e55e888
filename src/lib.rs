// FULLFRAME: decoder for fixed-geometry full-frame telemetry files
// Copyright 2024 - Licensed under GPLv3

pub mod bitwise;
pub mod core;
pub mod decoder;
pub mod formats;
pub mod frame;

// Re-export commonly used types
pub use crate::core::{parse_word_list, DecodeOptions};
pub use bitwise::{decode_time_of_day, extract_words, BcdError};
pub use decoder::{decode, CancelToken, Decoder, DumpSinks};
pub use formats::{
    render_hex, write_hex, ConsoleSink, FileSink, HexError, LineSink, MemorySink, WriteMode,
};
pub use frame::{
    DecodedFrame, FrameError, FrameGeometry, FrameWindow, Quality, ReadPlan, TelemetryResult,
    TimePolicy,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
