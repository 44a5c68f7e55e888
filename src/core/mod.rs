// Decode configuration and word selection
pub mod options;
pub mod selection;

pub use options::{DecodeOptions, DEFAULT_CHUNK_FRAMES};
pub use selection::{parse_word_list, resolve_words};
