// Text output: hex rendering, dump layout and sinks
pub mod dump;
pub mod hex;
pub mod sink;
pub mod table;

pub use dump::{header_line, write_rows, PREVIEW_ROWS};
pub use hex::{render_hex, render_hex_row, write_hex, HexError};
pub use sink::{ConsoleSink, FileSink, LineSink, MemorySink, SinkError, WriteMode};
pub use table::{parse_table, TableError};
