// Columnar aggregate of all decoded frames

use super::decode::{DecodedBlock, DecodedFrame, Quality};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Decoded telemetry for a whole frame selection.
///
/// `values` is a row-major `len() x word_count()` matrix stored in one
/// arena; use [`TelemetryResult::row`] to address a frame's values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryResult {
    word_indices: Vec<usize>,
    frame_numbers: Vec<u64>,
    times: Vec<f64>,
    quality: Vec<Quality>,
    #[serde(serialize_with = "serialize_rows")]
    values: ValueMatrix,
    malformed_times: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct ValueMatrix {
    data: Vec<u64>,
    columns: usize,
}

fn serialize_rows<S: Serializer>(matrix: &ValueMatrix, serializer: S) -> Result<S::Ok, S::Error> {
    let rows = if matrix.columns == 0 {
        0
    } else {
        matrix.data.len() / matrix.columns
    };
    let mut seq = serializer.serialize_seq(Some(rows))?;
    if matrix.columns > 0 {
        for row in matrix.data.chunks(matrix.columns) {
            seq.serialize_element(row)?;
        }
    }
    seq.end()
}

impl TelemetryResult {
    /// Create an empty result for the given word selection
    pub fn new(word_indices: Vec<usize>, capacity: usize) -> Self {
        let columns = word_indices.len();
        Self {
            word_indices,
            frame_numbers: Vec::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
            quality: Vec::with_capacity(capacity),
            values: ValueMatrix {
                data: Vec::with_capacity(capacity * columns),
                columns,
            },
            malformed_times: Vec::new(),
        }
    }

    /// Append a decoded block; blocks must arrive in read order
    pub(crate) fn append(&mut self, block: DecodedBlock) {
        self.frame_numbers.extend(block.frame_numbers);
        self.times.extend(block.times);
        self.quality.extend(block.quality);
        self.values.data.extend(block.values);
        self.malformed_times.extend(block.malformed_times);
    }

    /// Number of decoded frames
    pub fn len(&self) -> usize {
        self.frame_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_numbers.is_empty()
    }

    /// Number of values per frame
    pub fn word_count(&self) -> usize {
        self.values.columns
    }

    /// The 1-based word indices each value column came from
    pub fn word_indices(&self) -> &[usize] {
        &self.word_indices
    }

    pub fn frame_numbers(&self) -> &[u64] {
        &self.frame_numbers
    }

    /// Seconds of day per frame; NaN where the time field was malformed
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn quality(&self) -> &[Quality] {
        &self.quality
    }

    /// Positions (row indices) of frames whose time field was malformed
    pub fn malformed_times(&self) -> &[usize] {
        &self.malformed_times
    }

    /// Flat row-major value storage
    pub fn values(&self) -> &[u64] {
        &self.values.data
    }

    /// Values of the `i`-th decoded frame
    pub fn row(&self, i: usize) -> Option<&[u64]> {
        let wc = self.values.columns;
        self.values.data.get(i * wc..(i + 1) * wc)
    }

    /// Iterate value rows in frame order
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        (0..self.len()).filter_map(move |i| self.row(i))
    }

    /// Reassemble the `i`-th frame as a record
    pub fn frame(&self, i: usize) -> Option<DecodedFrame> {
        Some(DecodedFrame {
            frame_number: *self.frame_numbers.get(i)?,
            time_of_day: self.times[i],
            quality: self.quality[i],
            values: self.row(i)?.to_vec(),
        })
    }
}
