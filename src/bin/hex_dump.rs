//! Hex rendering utility
//! Renders a numeric text table as fixed-width hexadecimal lines

use anyhow::Context;
use clap::Parser;
use fullframe::formats::parse_table;
use fullframe::{render_hex, ConsoleSink, FileSink, LineSink, WriteMode};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Render numeric tables as fixed-width hex", long_about = None)]
struct Args {
    /// Input table (one row per line); reads stdin when omitted
    input: Option<PathBuf>,

    /// Bytes per element; each value renders as twice this many hex digits
    #[arg(short = 'e', long, default_value_t = 2)]
    element_bytes: usize,

    /// Text written after every element
    #[arg(short, long, default_value = " ")]
    delimiter: String,

    /// Output file; prints to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write mode for the output file: overwrite or append
    #[arg(long, default_value = "overwrite")]
    write_mode: WriteMode,
}

fn main() -> anyhow::Result<()> {
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let rows = parse_table(&text)?;
    if rows.is_empty() {
        anyhow::bail!("input table has no rows");
    }
    let delimiter = args.delimiter.replace("\\t", "\t");

    // Render everything before touching the output so a bad table cannot
    // truncate an existing file
    let lines = render_hex(&rows, args.element_bytes, &delimiter)?;

    let mut sink: Box<dyn LineSink> = match &args.output {
        Some(path) => Box::new(
            FileSink::open(path, args.write_mode)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(ConsoleSink::stdout()),
    };

    for line in &lines {
        sink.write_line(line)?;
    }
    sink.close()?;

    tracing::info!("Rendered {} rows", lines.len());
    Ok(())
}
