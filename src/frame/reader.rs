// Sequential, strided reads of raw frames from a seekable byte source

use super::error::Result;
use super::window::ReadPlan;
use std::io::{self, Read, Seek, SeekFrom};

/// A contiguous block of whole raw frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrames {
    bytes: Vec<u8>,
    frame_size: usize,
    /// Position of the first frame in this block within the whole read
    first_index: usize,
}

impl RawFrames {
    pub fn new(bytes: Vec<u8>, frame_size: usize, first_index: usize) -> Self {
        Self {
            bytes,
            frame_size,
            first_index,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.frame_size
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn first_index(&self) -> usize {
        self.first_index
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Raw bytes of the `i`-th frame of this block
    pub fn frame(&self, i: usize) -> Option<&[u8]> {
        self.bytes
            .get(i * self.frame_size..(i + 1) * self.frame_size)
    }

    pub fn iter(&self) -> std::slice::Chunks<'_, u8> {
        self.bytes.chunks(self.frame_size)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Reads frames according to a [`ReadPlan`].
///
/// Running out of source before the plan is complete is not an error: the
/// reader stops at the last whole frame and reports how many it got.
pub struct FrameReader<R> {
    source: R,
    plan: ReadPlan,
    frames_read: usize,
    positioned: bool,
    exhausted: bool,
}

impl<R: Read + Seek> FrameReader<R> {
    pub fn new(source: R, plan: ReadPlan) -> Self {
        Self {
            source,
            plan,
            frames_read: 0,
            positioned: false,
            exhausted: false,
        }
    }

    pub fn plan(&self) -> &ReadPlan {
        &self.plan
    }

    /// Frames read so far
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// True once the plan is satisfied or the source ran out
    pub fn is_done(&self) -> bool {
        self.exhausted || self.frames_read >= self.plan.frame_count
    }

    /// Read up to `max_frames` further frames.
    /// Returns an empty block once the reader is done.
    pub fn next_chunk(&mut self, max_frames: usize) -> Result<RawFrames> {
        let first_index = self.frames_read;
        let frame_size = self.plan.frame_size;

        if !self.positioned {
            self.source.seek(SeekFrom::Start(self.plan.start_offset))?;
            self.positioned = true;
        }

        let wanted = max_frames.min(self.plan.frame_count.saturating_sub(self.frames_read));
        let mut bytes = Vec::with_capacity(wanted * frame_size);

        for _ in 0..wanted {
            if self.exhausted {
                break;
            }

            // Skip only between frames, never before the first one
            if self.frames_read > 0 && self.plan.skip_bytes > 0 {
                match i64::try_from(self.plan.skip_bytes) {
                    Ok(skip) => {
                        self.source.seek(SeekFrom::Current(skip))?;
                    }
                    Err(_) => {
                        // Next frame lies past any addressable offset
                        self.exhausted = true;
                        break;
                    }
                }
            }

            let start = bytes.len();
            bytes.resize(start + frame_size, 0);
            let filled = read_full(&mut self.source, &mut bytes[start..])?;
            if filled < frame_size {
                // Partial trailing frame is dropped
                bytes.truncate(start);
                self.exhausted = true;
                tracing::debug!(
                    "Source exhausted after {} frames ({} stray bytes)",
                    self.frames_read,
                    filled
                );
                break;
            }

            self.frames_read += 1;
        }

        Ok(RawFrames::new(bytes, frame_size, first_index))
    }

    /// Read every remaining frame of the plan into one block
    pub fn read_all(&mut self) -> Result<RawFrames> {
        let remaining = self.plan.frame_count.saturating_sub(self.frames_read);
        self.next_chunk(remaining)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Fill `buf` as far as the source allows; returns the number of bytes read
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::geometry::FrameGeometry;
    use crate::frame::window::FrameWindow;
    use std::io::Cursor;

    // 2 x 16-bit words + 8-byte tag = 12 bytes; every byte of frame n is n
    fn source(frames: usize, extra: usize) -> Vec<u8> {
        let mut data = Vec::new();
        for n in 1..=frames {
            data.extend(std::iter::repeat(n as u8).take(12));
        }
        data.extend(std::iter::repeat(0xEE).take(extra));
        data
    }

    fn plan_for(data: &[u8], window: FrameWindow) -> ReadPlan {
        let g = FrameGeometry::new(16, 2).unwrap();
        ReadPlan::resolve(data.len() as u64, &g, &window).unwrap()
    }

    #[test]
    fn test_read_all_frames() {
        let data = source(4, 0);
        let plan = plan_for(&data, FrameWindow::default());
        let mut reader = FrameReader::new(Cursor::new(data), plan);

        let frames = reader.read_all().unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames.frame(2).unwrap(), &[3u8; 12]);
        assert!(reader.is_done());
    }

    #[test]
    fn test_strided_read_in_file_order() {
        let data = source(10, 0);
        let plan = plan_for(
            &data,
            FrameWindow {
                first_frame: Some(2),
                last_frame: Some(10),
                stride: Some(3),
            },
        );
        let mut reader = FrameReader::new(Cursor::new(data), plan);

        let frames = reader.read_all().unwrap();
        let firsts: Vec<u8> = frames.iter().map(|f| f[0]).collect();
        assert_eq!(firsts, vec![2, 5, 8]);
    }

    #[test]
    fn test_truncated_source_drops_partial_frame() {
        // 1.5 frames on disk, 2 requested
        let data = source(1, 6);
        let plan = plan_for(
            &data,
            FrameWindow {
                last_frame: Some(2),
                ..Default::default()
            },
        );
        assert_eq!(plan.frame_count, 2);

        let mut reader = FrameReader::new(Cursor::new(data), plan);
        let frames = reader.read_all().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(reader.frames_read(), 1);
        assert!(reader.is_done());
    }

    #[test]
    fn test_chunked_reads_match_single_read() {
        let data = source(7, 0);
        let plan = plan_for(&data, FrameWindow::default());

        let mut whole = FrameReader::new(Cursor::new(data.clone()), plan);
        let all = whole.read_all().unwrap();

        let mut chunked = FrameReader::new(Cursor::new(data), plan);
        let mut bytes = Vec::new();
        let mut indices = Vec::new();
        while !chunked.is_done() {
            let chunk = chunked.next_chunk(3).unwrap();
            indices.push(chunk.first_index());
            bytes.extend_from_slice(chunk.as_bytes());
        }

        assert_eq!(indices, vec![0, 3, 6]);
        assert_eq!(bytes, all.as_bytes());
    }

    #[test]
    fn test_stride_past_addressable_range_ends_read() {
        let data = source(4, 0);
        let plan = plan_for(
            &data,
            FrameWindow {
                first_frame: Some(1),
                last_frame: Some(u64::MAX),
                stride: Some(1 << 62),
            },
        );
        assert_eq!(plan.frame_count, 3);

        let mut reader = FrameReader::new(Cursor::new(data), plan);
        let frames = reader.read_all().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames.frame(0).unwrap(), &[1u8; 12]);
        assert!(reader.is_done());
    }
}
