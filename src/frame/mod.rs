// Full-frame layout, selection, reading and decoding
pub mod decode;
pub mod error;
pub mod geometry;
pub mod reader;
pub mod result;
pub mod window;

pub use decode::{DecodedFrame, FrameDecoder, Quality, TimePolicy};
pub use error::{FrameError, Result};
pub use geometry::FrameGeometry;
pub use reader::{FrameReader, RawFrames};
pub use result::TelemetryResult;
pub use window::{FrameWindow, ReadPlan};
