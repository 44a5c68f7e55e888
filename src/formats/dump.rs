//! Delimited text dump of a decoded telemetry result

use super::hex::render_hex;
use super::sink::LineSink;
use crate::frame::{Result, TelemetryResult};
use std::ops::Range;

/// Rows shown on the console preview
pub const PREVIEW_ROWS: usize = 30;

/// Rows rendered per hex call when dumping a whole result
const RENDER_CHUNK_ROWS: usize = 1024;

/// Build the header line for the given word selection
/// Example: words [3, 1], "," -> "Frame_Num,Time(sec),Qual_Wd_1,Qual_Wd_2,Word_3,Word_1,"
pub fn header_line(word_indices: &[usize], delimiter: &str) -> String {
    let mut line = String::new();
    for name in ["Frame_Num", "Time(sec)", "Qual_Wd_1", "Qual_Wd_2"] {
        line.push_str(name);
        line.push_str(delimiter);
    }
    for w in word_indices {
        line.push_str(&format!("Word_{}", w));
        line.push_str(delimiter);
    }
    line
}

/// Fixed-format leading columns: frame number, time, quality bytes
fn prefix_columns(result: &TelemetryResult, i: usize, delimiter: &str) -> String {
    let time = result.times()[i];
    let time = if time.is_finite() {
        format!("{:.6}", time)
    } else {
        "NaN".to_string()
    };
    let quality = result.quality()[i];

    format!(
        "{}{d}{}{d}{}{d}{}{d}",
        result.frame_numbers()[i],
        time,
        quality.high,
        quality.low,
        d = delimiter
    )
}

/// Write data rows `rows` of a result to a sink; returns the number written.
/// Rows are hex-rendered in bounded chunks.
pub fn write_rows(
    sink: &mut dyn LineSink,
    result: &TelemetryResult,
    rows: Range<usize>,
    element_size_bytes: usize,
    delimiter: &str,
) -> Result<usize> {
    let end = rows.end.min(result.len());
    let mut start = rows.start.min(end);
    let mut written = 0;

    while start < end {
        let chunk_end = (start + RENDER_CHUNK_ROWS).min(end);
        let values: Vec<&[u64]> = (start..chunk_end).filter_map(|i| result.row(i)).collect();
        let hex = render_hex(&values, element_size_bytes, delimiter)?;

        for (i, hex_values) in (start..chunk_end).zip(hex) {
            let mut line = prefix_columns(result, i, delimiter);
            line.push_str(&hex_values);
            sink.write_line(&line)?;
            written += 1;
        }
        start = chunk_end;
    }

    Ok(written)
}
