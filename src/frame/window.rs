// Frame range and stride resolution into a read plan

use super::error::{FrameError, Result};
use super::geometry::FrameGeometry;
use serde::{Deserialize, Serialize};

/// Requested frame window; unset fields take their defaults when resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    /// First frame to read, 1-based (default 1)
    pub first_frame: Option<u64>,

    /// Last frame to read (default: last complete frame in the source)
    pub last_frame: Option<u64>,

    /// Sampling period (default 1)
    pub stride: Option<u64>,
}

/// Concrete byte-level plan for reading a frame window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPlan {
    pub first_frame: u64,
    pub last_frame: u64,
    pub stride: u64,
    pub start_offset: u64,
    pub frame_size: usize,
    pub skip_bytes: u64,
    /// Frames the plan expects to read; the reader may return fewer
    pub frame_count: usize,
}

impl ReadPlan {
    /// Resolve a window against a source of `total_source_bytes`
    pub fn resolve(
        total_source_bytes: u64,
        geometry: &FrameGeometry,
        window: &FrameWindow,
    ) -> Result<Self> {
        let frame_size = geometry.frame_size_bytes();
        let first_frame = window.first_frame.unwrap_or(1);
        let last_frame = window
            .last_frame
            .unwrap_or_else(|| geometry.complete_frames(total_source_bytes));
        let stride = window.stride.unwrap_or(1);

        if first_frame < 1 {
            return Err(FrameError::InvalidRange(
                "first frame must be at least 1".to_string(),
            ));
        }
        if stride < 1 {
            return Err(FrameError::InvalidRange(
                "frame stride must be at least 1".to_string(),
            ));
        }
        if last_frame < first_frame {
            return Err(FrameError::InvalidRange(format!(
                "last frame {} precedes first frame {}",
                last_frame, first_frame
            )));
        }

        let start_offset = (first_frame - 1)
            .checked_mul(frame_size as u64)
            .ok_or_else(|| FrameError::InvalidRange("start offset overflows".to_string()))?;
        if start_offset >= total_source_bytes {
            return Err(FrameError::InvalidRange(format!(
                "first frame {} starts at byte {} beyond the {}-byte source",
                first_frame, start_offset, total_source_bytes
            )));
        }

        // Saturates: a skip past u64::MAX lands beyond any source anyway
        let skip_bytes = (stride - 1).saturating_mul(frame_size as u64);

        let frame_count = usize::try_from((last_frame - (first_frame - 1)) / stride)
            .map_err(|_| FrameError::InvalidRange("frame count overflows".to_string()))?;

        Ok(Self {
            first_frame,
            last_frame,
            stride,
            start_offset,
            frame_size,
            skip_bytes,
            frame_count,
        })
    }

    /// Frame number of the `index`-th frame read under this plan
    pub fn frame_number(&self, index: usize) -> u64 {
        self.first_frame + index as u64 * self.stride
    }
}
