//! Fixed-width hexadecimal rendering of numeric rows
//!
//! Each element becomes exactly `2 * element_size_bytes` uppercase hex digits
//! followed by the delimiter. Rendering is stateless per row, so a table can
//! be rendered in chunks and the concatenated output is identical to a
//! single call over the whole table.

use super::sink::{LineSink, SinkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HexError {
    #[error("Value {value:#x} does not fit in {element_size_bytes} byte(s)")]
    ValueOverflow {
        value: u64,
        element_size_bytes: usize,
    },

    #[error("Invalid element size: {0} bytes (expected 1..=8)")]
    InvalidElementSize(usize),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, HexError>;

const MAX_ELEMENT_BYTES: usize = 8;

/// Largest value representable in `element_size_bytes` bytes
pub fn max_value(element_size_bytes: usize) -> Result<u64> {
    match element_size_bytes {
        1..=7 => Ok((1u64 << (8 * element_size_bytes)) - 1),
        MAX_ELEMENT_BYTES => Ok(u64::MAX),
        other => Err(HexError::InvalidElementSize(other)),
    }
}

/// Append one rendered element (digits + delimiter) to `out`
fn push_element(
    out: &mut String,
    value: u64,
    element_size_bytes: usize,
    max: u64,
    delimiter: &str,
) -> Result<()> {
    if value > max {
        return Err(HexError::ValueOverflow {
            value,
            element_size_bytes,
        });
    }
    out.push_str(&format!("{:0width$X}", value, width = 2 * element_size_bytes));
    out.push_str(delimiter);
    Ok(())
}

/// Render a single row
/// Example: [255, 1], 2 bytes, "," -> "00FF,0001,"
pub fn render_hex_row(row: &[u64], element_size_bytes: usize, delimiter: &str) -> Result<String> {
    let max = max_value(element_size_bytes)?;
    let mut line = String::with_capacity(row.len() * (2 * element_size_bytes + delimiter.len()));
    for &value in row {
        push_element(&mut line, value, element_size_bytes, max, delimiter)?;
    }
    Ok(line)
}

/// Render every row into one line, preserving row and column order
pub fn render_hex<R: AsRef<[u64]>>(
    rows: &[R],
    element_size_bytes: usize,
    delimiter: &str,
) -> Result<Vec<String>> {
    rows.iter()
        .map(|row| render_hex_row(row.as_ref(), element_size_bytes, delimiter))
        .collect()
}

/// Render rows into a sink; returns the number of lines written.
/// The whole table is rendered before the first write, so an overflow or a
/// bad element size leaves the sink untouched.
pub fn write_hex<R: AsRef<[u64]>>(
    sink: &mut dyn LineSink,
    rows: &[R],
    element_size_bytes: usize,
    delimiter: &str,
) -> Result<usize> {
    let lines = render_hex(rows, element_size_bytes, delimiter)?;
    for line in &lines {
        sink.write_line(line)?;
    }
    sink.flush()?;
    Ok(lines.len())
}
