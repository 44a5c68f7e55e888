// Decode orchestration: plan, read, decode and dump a frame selection

use crate::core::{resolve_words, DecodeOptions};
use crate::formats::{
    dump::header_line, write_rows, ConsoleSink, FileSink, LineSink, PREVIEW_ROWS,
};
use crate::frame::{
    FrameDecoder, FrameError, FrameGeometry, FrameReader, ReadPlan, Result, TelemetryResult,
};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag for stopping a long decode between read chunks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where decoded rows are written while decoding
#[derive(Default)]
pub struct DumpSinks<'a> {
    /// Receives the header and the first `PREVIEW_ROWS` rows
    pub preview: Option<&'a mut dyn LineSink>,

    /// Receives every row; the header is skipped when appending
    pub full: Option<&'a mut dyn LineSink>,

    pub append: bool,
}

impl<'a> DumpSinks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    fn close_all(&mut self) -> Result<()> {
        let mut first_err = None;
        for sink in [self.preview.as_deref_mut(), self.full.as_deref_mut()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = sink.close() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// Decodes a frame selection for a fixed geometry and option set.
///
/// Options and the word selection are validated up front, so a `Decoder`
/// that constructs successfully only fails on range, I/O or data errors.
#[derive(Debug, Clone)]
pub struct Decoder {
    geometry: FrameGeometry,
    options: DecodeOptions,
    words: Vec<usize>,
    cancel: CancelToken,
}

impl Decoder {
    pub fn new(geometry: FrameGeometry, options: DecodeOptions) -> Result<Self> {
        options.validate()?;
        let words = resolve_words(options.get_words.as_deref(), &geometry)?;

        Ok(Self {
            geometry,
            options,
            words,
            cancel: CancelToken::new(),
        })
    }

    /// Use an externally owned cancellation flag
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Word indices that will be extracted, in output order
    pub fn words(&self) -> &[usize] {
        &self.words
    }

    /// Resolve the configured window against a source length
    pub fn plan(&self, total_source_bytes: u64) -> Result<ReadPlan> {
        ReadPlan::resolve(total_source_bytes, &self.geometry, &self.options.window())
    }

    /// Measure the source, resolve the plan, then decode. Sinks are closed
    /// on every exit path.
    pub fn decode<R: Read + Seek>(
        &self,
        mut source: R,
        sinks: &mut DumpSinks<'_>,
    ) -> Result<TelemetryResult> {
        let outcome = source
            .seek(SeekFrom::End(0))
            .map_err(FrameError::from)
            .and_then(|total| self.plan(total))
            .and_then(|plan| self.run(source, plan, sinks));
        finish(outcome, sinks)
    }

    /// Decode according to an already resolved plan. Sinks are closed on
    /// every exit path.
    pub fn decode_planned<R: Read + Seek>(
        &self,
        source: R,
        plan: ReadPlan,
        sinks: &mut DumpSinks<'_>,
    ) -> Result<TelemetryResult> {
        let outcome = self.run(source, plan, sinks);
        finish(outcome, sinks)
    }

    fn run<R: Read + Seek>(
        &self,
        source: R,
        plan: ReadPlan,
        sinks: &mut DumpSinks<'_>,
    ) -> Result<TelemetryResult> {
        tracing::info!(
            "Decoding frames {}..={} stride {} ({}; {} planned)",
            plan.first_frame,
            plan.last_frame,
            plan.stride,
            self.geometry,
            plan.frame_count
        );

        let decoder = FrameDecoder::new(&self.geometry, &self.words, self.options.time_policy)?;
        let delimiter = self.options.delimiter.as_str();
        let esb = self.geometry.word_size_bytes();

        let header = header_line(&self.words, delimiter);
        if let Some(sink) = sinks.preview.as_deref_mut() {
            sink.write_line(&header)?;
        }
        if !sinks.append {
            if let Some(sink) = sinks.full.as_deref_mut() {
                sink.write_line(&header)?;
            }
        }

        let capacity = plan.frame_count.min(self.options.chunk_frames.saturating_mul(4));
        let mut result = TelemetryResult::new(self.words.clone(), capacity);
        let mut reader = FrameReader::new(source, plan);

        while !reader.is_done() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Decode cancelled after {} frames", reader.frames_read());
                return Err(FrameError::Cancelled {
                    frames_read: reader.frames_read(),
                });
            }

            let chunk = reader.next_chunk(self.options.chunk_frames)?;
            if chunk.is_empty() {
                break;
            }

            let block = decoder.decode_block(&chunk, &plan, self.options.workers)?;
            let start = result.len();
            result.append(block);
            let end = result.len();
            tracing::debug!("Decoded frames {}..{}", start, end);

            if let Some(sink) = sinks.preview.as_deref_mut() {
                if start < PREVIEW_ROWS {
                    write_rows(sink, &result, start..end.min(PREVIEW_ROWS), esb, delimiter)?;
                }
            }
            if let Some(sink) = sinks.full.as_deref_mut() {
                write_rows(sink, &result, start..end, esb, delimiter)?;
                sink.flush()?;
            }
        }

        if result.len() < plan.frame_count {
            tracing::info!(
                "Source ended early: read {} of {} planned frames",
                result.len(),
                plan.frame_count
            );
        }
        if !result.malformed_times().is_empty() {
            tracing::warn!(
                "{} frame(s) had a malformed time field",
                result.malformed_times().len()
            );
        }
        tracing::info!("Decoded {} frames", result.len());

        Ok(result)
    }
}

/// Close the sinks, preferring the decode error over a close error
fn finish(outcome: Result<TelemetryResult>, sinks: &mut DumpSinks<'_>) -> Result<TelemetryResult> {
    let closed = sinks.close_all();
    let result = outcome?;
    closed?;
    Ok(result)
}

/// Decode a telemetry file.
///
/// Writes the preview to stdout when `options.preview` is set and the full
/// dump to `options.dump_file` when one is given. Nothing is opened for
/// writing until the geometry, options and frame range have been validated.
pub fn decode(
    path: impl AsRef<Path>,
    frame_word_count: usize,
    word_size_bits: u32,
    options: &DecodeOptions,
) -> Result<TelemetryResult> {
    let geometry = FrameGeometry::new(word_size_bits, frame_word_count)?;
    let decoder = Decoder::new(geometry, options.clone())?;

    let path = path.as_ref();
    let file = File::open(path)?;
    let total = file.metadata()?.len();
    let plan = decoder.plan(total)?;
    tracing::info!("Opened {} ({} bytes)", path.display(), total);

    let mut console = ConsoleSink::stdout();
    let mut dump = match &options.dump_file {
        Some(dump_path) => Some(FileSink::open(dump_path, options.write_mode)?),
        None => None,
    };

    let mut sinks = DumpSinks {
        preview: if options.preview {
            Some(&mut console as &mut dyn LineSink)
        } else {
            None
        },
        full: dump.as_mut().map(|s| s as &mut dyn LineSink),
        append: options.write_mode.is_append(),
    };

    decoder.decode_planned(file, plan, &mut sinks)
}
