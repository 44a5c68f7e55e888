//! Full-frame dump utility
//! Decodes a full-frame telemetry file, previews the first records and
//! optionally writes a complete text dump and a JSON export

use anyhow::Context;
use clap::Parser;
use fullframe::{decode, parse_word_list, DecodeOptions, TimePolicy, WriteMode};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode full-frame telemetry files", long_about = None)]
struct Args {
    /// Telemetry file to decode
    input: PathBuf,

    /// Words per frame
    #[arg(short = 'n', long)]
    frame_words: usize,

    /// Bits per word
    #[arg(short = 'b', long)]
    word_bits: u32,

    /// JSON options file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Words to extract, e.g. "1-4,7,7" (default: all)
    #[arg(short = 'w', long)]
    get_words: Option<String>,

    /// First frame to read (1-based)
    #[arg(long)]
    first_frame: Option<u64>,

    /// Last frame to read
    #[arg(long)]
    last_frame: Option<u64>,

    /// Read every Nth frame
    #[arg(short = 's', long)]
    frame_stride: Option<u64>,

    /// Write the full text dump to this file
    #[arg(short = 'o', long)]
    dump_file: Option<PathBuf>,

    /// Write mode for the dump file: overwrite or append
    #[arg(long)]
    write_mode: Option<WriteMode>,

    /// Field delimiter for text output
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Decode worker threads
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Frames per read chunk
    #[arg(long)]
    chunk_frames: Option<usize>,

    /// Fail on a malformed time field instead of marking the frame
    #[arg(long)]
    strict_time: bool,

    /// Suppress the console preview
    #[arg(short, long)]
    quiet: bool,

    /// Export the decoded result as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> anyhow::Result<DecodeOptions> {
        let mut opts = match &self.config {
            Some(path) => DecodeOptions::from_json_file(path)
                .with_context(|| format!("loading options from {}", path.display()))?,
            None => DecodeOptions::default(),
        };

        if let Some(words) = &self.get_words {
            opts.get_words = Some(parse_word_list(words)?);
        }
        if self.first_frame.is_some() {
            opts.first_frame = self.first_frame;
        }
        if self.last_frame.is_some() {
            opts.last_frame = self.last_frame;
        }
        if self.frame_stride.is_some() {
            opts.frame_stride = self.frame_stride;
        }
        if let Some(path) = &self.dump_file {
            opts.dump_file = Some(path.clone());
        }
        if let Some(mode) = self.write_mode {
            opts.write_mode = mode;
        }
        if let Some(delimiter) = &self.delimiter {
            opts.delimiter = unescape(delimiter);
        }
        if let Some(workers) = self.workers {
            opts.workers = workers;
        }
        if let Some(chunk_frames) = self.chunk_frames {
            opts.chunk_frames = chunk_frames;
        }
        if self.strict_time {
            opts.time_policy = TimePolicy::Strict;
        }
        if self.quiet {
            opts.preview = false;
        }

        Ok(opts)
    }
}

/// Allow "\t" and friends on the command line
fn unescape(s: &str) -> String {
    s.replace("\\t", "\t").replace("\\n", "\n")
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args = Args::parse();
    let options = args.options()?;

    tracing::info!("Full-frame dump utility");
    tracing::info!("Input: {}", args.input.display());

    let result = decode(&args.input, args.frame_words, args.word_bits, &options)
        .with_context(|| format!("decoding {}", args.input.display()))?;

    if let Some(path) = &options.dump_file {
        tracing::info!("Wrote {} records to {}", result.len(), path.display());
    }

    if let Some(path) = &args.json {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &result)?;
        writer.flush()?;
        tracing::info!("Saved JSON export to: {}", path.display());
    }

    if result.is_empty() {
        tracing::warn!("No complete frames in the requested range");
    }

    Ok(())
}
