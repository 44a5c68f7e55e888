// Per-frame decoding of words, quality and time, optionally across worker threads

use super::error::{FrameError, Result};
use super::geometry::FrameGeometry;
use super::reader::RawFrames;
use super::window::ReadPlan;
use crate::bitwise::elements::{check_word_indices, extract_words_into};
use crate::bitwise::{decode_time_of_day, parse_frame, RawTag};
use serde::{Deserialize, Serialize};
use std::thread;

/// The two quality bytes at the start of a frame's tag region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Quality {
    pub high: u8,
    pub low: u8,
}

impl Quality {
    pub fn from_tag(tag: &RawTag) -> Self {
        Self {
            high: tag.quality_high,
            low: tag.quality_low,
        }
    }
}

/// What to do with a frame whose time field has a non-decimal nibble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePolicy {
    /// Abort the decode with `MalformedTimeField`
    Strict,
    /// Store NaN for the time and record the frame as malformed
    #[default]
    MarkInvalid,
}

/// One fully decoded frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    pub frame_number: u64,
    pub time_of_day: f64,
    pub quality: Quality,
    pub values: Vec<u64>,
}

/// Decoded columns for one block of frames, in frame order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBlock {
    pub frame_numbers: Vec<u64>,
    pub times: Vec<f64>,
    pub quality: Vec<Quality>,
    pub values: Vec<u64>,
    /// Indices (relative to the whole read) of frames with a malformed time
    pub malformed_times: Vec<usize>,
}

/// Mutable output rows owned by a single worker
struct RowsMut<'a> {
    frame_numbers: &'a mut [u64],
    times: &'a mut [f64],
    quality: &'a mut [Quality],
    values: &'a mut [u64],
}

/// Decodes raw frames for a fixed geometry and word selection
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder<'a> {
    geometry: &'a FrameGeometry,
    words: &'a [usize],
    time_policy: TimePolicy,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(
        geometry: &'a FrameGeometry,
        words: &'a [usize],
        time_policy: TimePolicy,
    ) -> Result<Self> {
        if words.is_empty() {
            return Err(FrameError::InvalidOptions(
                "at least one word must be selected".to_string(),
            ));
        }
        check_word_indices(words, geometry.frame_word_count())?;

        Ok(Self {
            geometry,
            words,
            time_policy,
        })
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Decode a single raw frame. A malformed time field is always an error here.
    pub fn decode_frame(&self, raw: &[u8], frame_number: u64) -> Result<DecodedFrame> {
        let mut values = vec![0u64; self.words.len()];
        let tag = self.split_frame(raw, &mut values)?;
        let time_of_day = decode_time_of_day(&tag.time)
            .map_err(|source| FrameError::MalformedTimeField {
                frame: frame_number,
                source,
            })?;

        Ok(DecodedFrame {
            frame_number,
            time_of_day,
            quality: Quality::from_tag(&tag),
            values,
        })
    }

    /// Decode a block of frames, splitting the rows across `workers` threads.
    /// Each worker writes only its own contiguous range of rows.
    pub fn decode_block(
        &self,
        frames: &RawFrames,
        plan: &ReadPlan,
        workers: usize,
    ) -> Result<DecodedBlock> {
        let n = frames.len();
        let wc = self.words.len();

        let mut block = DecodedBlock {
            frame_numbers: vec![0; n],
            times: vec![0.0; n],
            quality: vec![Quality::default(); n],
            values: vec![0; n * wc],
            malformed_times: Vec::new(),
        };
        if n == 0 {
            return Ok(block);
        }

        let workers = workers.clamp(1, n);
        let rows_per_worker = (n + workers - 1) / workers;

        let malformed = if workers == 1 {
            let rows = RowsMut {
                frame_numbers: &mut block.frame_numbers,
                times: &mut block.times,
                quality: &mut block.quality,
                values: &mut block.values,
            };
            vec![self.decode_rows(frames, plan, 0, rows)]
        } else {
            let outputs = block
                .frame_numbers
                .chunks_mut(rows_per_worker)
                .zip(block.times.chunks_mut(rows_per_worker))
                .zip(block.quality.chunks_mut(rows_per_worker))
                .zip(block.values.chunks_mut(rows_per_worker * wc));

            thread::scope(|s| {
                let handles: Vec<_> = outputs
                    .enumerate()
                    .map(|(k, (((frame_numbers, times), quality), values))| {
                        let rows = RowsMut {
                            frame_numbers,
                            times,
                            quality,
                            values,
                        };
                        s.spawn(move || self.decode_rows(frames, plan, k * rows_per_worker, rows))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|h| match h.join() {
                        Ok(result) => result,
                        Err(panic) => std::panic::resume_unwind(panic),
                    })
                    .collect::<Vec<_>>()
            })
        };

        // Workers own ascending row ranges, so concatenation keeps frame order
        for result in malformed {
            block.malformed_times.extend(result?);
        }

        Ok(block)
    }

    fn decode_rows(
        &self,
        frames: &RawFrames,
        plan: &ReadPlan,
        start_row: usize,
        rows: RowsMut<'_>,
    ) -> Result<Vec<usize>> {
        let wc = self.words.len();
        let mut malformed = Vec::new();

        for (i, frame_number) in rows.frame_numbers.iter_mut().enumerate() {
            let row = start_row + i;
            let read_index = frames.first_index() + row;
            let raw = frames.frame(row).ok_or_else(|| {
                FrameError::InvalidRange(format!("frame {} missing from block", row))
            })?;

            *frame_number = plan.frame_number(read_index);
            let tag = self.split_frame(raw, &mut rows.values[i * wc..(i + 1) * wc])?;
            rows.quality[i] = Quality::from_tag(&tag);

            rows.times[i] = match decode_time_of_day(&tag.time) {
                Ok(t) => t,
                Err(source) => match self.time_policy {
                    TimePolicy::Strict => {
                        return Err(FrameError::MalformedTimeField {
                            frame: *frame_number,
                            source,
                        })
                    }
                    TimePolicy::MarkInvalid => {
                        tracing::warn!("Frame {}: malformed time field: {}", frame_number, source);
                        malformed.push(read_index);
                        f64::NAN
                    }
                },
            };
        }

        Ok(malformed)
    }

    /// Extract the selected words into `values` and return the parsed tag
    fn split_frame(&self, raw: &[u8], values: &mut [u64]) -> Result<RawTag> {
        let (_, (data, tag)) = parse_frame(raw, self.geometry.data_region_bytes()).map_err(|_| {
            FrameError::InvalidGeometry(format!(
                "raw frame of {} bytes is shorter than {} bytes",
                raw.len(),
                self.geometry.frame_size_bytes()
            ))
        })?;
        extract_words_into(data, self.words, self.geometry.word_size_bytes(), values)?;
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::window::FrameWindow;

    const EXAMPLE_FRAME: [u8; 12] = [
        0x00, 0x01, 0x00, 0x02, 0xAA, 0xBB, 0x12, 0x34, 0x56, 0x00, 0x00, 0x00,
    ];

    fn geometry() -> FrameGeometry {
        FrameGeometry::new(16, 2).unwrap()
    }

    fn frames_with_times(times: &[[u8; 6]]) -> Vec<u8> {
        let mut data = Vec::new();
        for (n, time) in times.iter().enumerate() {
            data.extend_from_slice(&(n as u16).to_be_bytes());
            data.extend_from_slice(&(0x1000u16 + n as u16).to_be_bytes());
            data.extend_from_slice(&[n as u8, 0xFF]);
            data.extend_from_slice(time);
        }
        data
    }

    #[test]
    fn test_decode_example_frame() {
        let g = geometry();
        let words = [1, 2];
        let decoder = FrameDecoder::new(&g, &words, TimePolicy::Strict).unwrap();

        let frame = decoder.decode_frame(&EXAMPLE_FRAME, 1).unwrap();
        assert_eq!(frame.values, vec![1, 2]);
        assert_eq!(frame.quality, Quality { high: 0xAA, low: 0xBB });
        assert_eq!(frame.time_of_day, 45296.0);
    }

    #[test]
    fn test_word_order_and_duplicates() {
        let g = geometry();
        let words = [2, 2, 1];
        let decoder = FrameDecoder::new(&g, &words, TimePolicy::Strict).unwrap();
        let frame = decoder.decode_frame(&EXAMPLE_FRAME, 1).unwrap();
        assert_eq!(frame.values, vec![2, 2, 1]);
    }

    #[test]
    fn test_out_of_range_word_rejected_up_front() {
        let g = geometry();
        assert!(matches!(
            FrameDecoder::new(&g, &[1, 3], TimePolicy::Strict),
            Err(FrameError::IndexOutOfRange {
                index: 3,
                word_count: 2
            })
        ));
        assert!(matches!(
            FrameDecoder::new(&g, &[], TimePolicy::Strict),
            Err(FrameError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_short_frame_rejected() {
        let g = geometry();
        let words = [1];
        let decoder = FrameDecoder::new(&g, &words, TimePolicy::Strict).unwrap();
        assert!(decoder.decode_frame(&EXAMPLE_FRAME[..10], 1).is_err());
    }

    #[test]
    fn test_parallel_block_matches_serial() {
        let times: Vec<[u8; 6]> = (0..37u8).map(|s| [0x00, 0x00, s % 10, 0, 0, 0]).collect();
        let data = frames_with_times(&times);
        let g = geometry();
        let plan = ReadPlan::resolve(data.len() as u64, &g, &FrameWindow::default()).unwrap();
        let frames = RawFrames::new(data, g.frame_size_bytes(), 0);
        let words = [2, 1];
        let decoder = FrameDecoder::new(&g, &words, TimePolicy::Strict).unwrap();

        let serial = decoder.decode_block(&frames, &plan, 1).unwrap();
        for workers in [2, 3, 8, 64] {
            let parallel = decoder.decode_block(&frames, &plan, workers).unwrap();
            assert_eq!(parallel, serial, "workers = {}", workers);
        }

        assert_eq!(serial.frame_numbers[..3], [1, 2, 3]);
        assert_eq!(serial.values[..4], [0x1000, 0, 0x1001, 1]);
        assert_eq!(serial.quality[5], Quality { high: 5, low: 0xFF });
    }

    #[test]
    fn test_malformed_time_policies() {
        let times = [[0u8; 6], [0x00, 0x00, 0x00, 0x00, 0x0F, 0x00], [0u8; 6]];
        let data = frames_with_times(&times);
        let g = geometry();
        let plan = ReadPlan::resolve(data.len() as u64, &g, &FrameWindow::default()).unwrap();
        let frames = RawFrames::new(data, g.frame_size_bytes(), 0);
        let words = [1];

        let lenient = FrameDecoder::new(&g, &words, TimePolicy::MarkInvalid).unwrap();
        let block = lenient.decode_block(&frames, &plan, 2).unwrap();
        assert_eq!(block.malformed_times, vec![1]);
        assert!(block.times[1].is_nan());
        assert_eq!(block.times[2], 0.0);

        let strict = FrameDecoder::new(&g, &words, TimePolicy::Strict).unwrap();
        match strict.decode_block(&frames, &plan, 1) {
            Err(FrameError::MalformedTimeField { frame, .. }) => assert_eq!(frame, 2),
            other => panic!("expected malformed time error, got {:?}", other),
        }
    }
}
