// Bit-level decoding of frame contents

pub mod bcd;
pub mod elements;
pub mod parser;

pub use bcd::{decode_time_of_day, BcdError, TIME_FIELD_BYTES};
pub use elements::{extract_words, extract_words_into, read_uint_be, ElementError};
pub use parser::{parse_frame, parse_tag, RawTag, TAG_REGION_BYTES};
