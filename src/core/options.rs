// Decode options: every recognized setting with its default

use crate::formats::WriteMode;
use crate::frame::{FrameError, FrameWindow, Result, TimePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Frames read per chunk unless configured otherwise
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// Options for one decode call.
///
/// Deserializes from JSON with any subset of fields; unset fields keep the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// 1-based word indices to extract, in output order (default: all words)
    pub get_words: Option<Vec<usize>>,

    /// First frame to read, 1-based (default 1)
    pub first_frame: Option<u64>,

    /// Last frame to read (default: last complete frame)
    pub last_frame: Option<u64>,

    /// Frame sampling period (default 1)
    pub frame_stride: Option<u64>,

    /// Full text dump destination
    pub dump_file: Option<PathBuf>,

    /// Whether the dump file is overwritten or appended to
    pub write_mode: WriteMode,

    /// Print the header and first rows to stdout
    pub preview: bool,

    /// Field delimiter for text output
    pub delimiter: String,

    /// Decode worker threads
    pub workers: usize,

    /// Frames read per chunk
    pub chunk_frames: usize,

    pub time_policy: TimePolicy,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            get_words: None,
            first_frame: None,
            last_frame: None,
            frame_stride: None,
            dump_file: None,
            write_mode: WriteMode::Overwrite,
            preview: true,
            delimiter: "\t".to_string(),
            workers: 1,
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            time_policy: TimePolicy::MarkInvalid,
        }
    }
}

impl DecodeOptions {
    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FrameError::InvalidOptions(format!("bad options JSON: {}", e)))
    }

    /// Check settings that do not depend on the frame geometry
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(FrameError::InvalidOptions(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.chunk_frames == 0 {
            return Err(FrameError::InvalidOptions(
                "chunk_frames must be at least 1".to_string(),
            ));
        }
        if self.first_frame == Some(0) {
            return Err(FrameError::InvalidRange(
                "first frame must be at least 1".to_string(),
            ));
        }
        if self.frame_stride == Some(0) {
            return Err(FrameError::InvalidRange(
                "frame stride must be at least 1".to_string(),
            ));
        }
        if let (Some(first), Some(last)) = (self.first_frame, self.last_frame) {
            if last < first {
                return Err(FrameError::InvalidRange(format!(
                    "last frame {} precedes first frame {}",
                    last, first
                )));
            }
        }
        Ok(())
    }

    pub fn window(&self) -> FrameWindow {
        FrameWindow {
            first_frame: self.first_frame,
            last_frame: self.last_frame,
            stride: self.frame_stride,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = DecodeOptions::default();
        assert_eq!(opts.write_mode, WriteMode::Overwrite);
        assert_eq!(opts.delimiter, "\t");
        assert_eq!(opts.workers, 1);
        assert_eq!(opts.window(), FrameWindow::default());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let opts = DecodeOptions::from_json(
            r#"{"get_words":[2,2,1],"frame_stride":4,"write_mode":"append","time_policy":"strict"}"#,
        )
        .unwrap();
        assert_eq!(opts.get_words, Some(vec![2, 2, 1]));
        assert_eq!(opts.frame_stride, Some(4));
        assert_eq!(opts.write_mode, WriteMode::Append);
        assert_eq!(opts.time_policy, TimePolicy::Strict);
        assert_eq!(opts.delimiter, "\t");
        assert_eq!(opts.chunk_frames, DEFAULT_CHUNK_FRAMES);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            DecodeOptions::from_json(r#"{"write_mode":"truncate"}"#),
            Err(FrameError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_validation() {
        let bad = [
            DecodeOptions {
                workers: 0,
                ..Default::default()
            },
            DecodeOptions {
                first_frame: Some(0),
                ..Default::default()
            },
            DecodeOptions {
                frame_stride: Some(0),
                ..Default::default()
            },
            DecodeOptions {
                first_frame: Some(5),
                last_frame: Some(2),
                ..Default::default()
            },
        ];
        for opts in bad {
            assert!(opts.validate().is_err(), "{:?}", opts);
        }
    }
}
