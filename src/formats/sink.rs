// Line-oriented output sinks for text dumps

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Sink already closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// How a file sink treats an existing file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

impl WriteMode {
    pub fn is_append(&self) -> bool {
        matches!(self, WriteMode::Append)
    }
}

impl std::str::FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" | "w" => Ok(WriteMode::Overwrite),
            "append" | "a" => Ok(WriteMode::Append),
            other => Err(format!("unknown write mode: {}", other)),
        }
    }
}

/// Destination for dump lines. Lines are written without their terminator.
pub trait LineSink {
    fn write_line(&mut self, line: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// Flush and release the destination; further writes fail
    fn close(&mut self) -> Result<()>;
}

/// Sink over any writer, stdout by default
pub struct ConsoleSink<W: Write = Stdout> {
    writer: W,
    closed: bool,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for ConsoleSink<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.writer.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

/// Buffered file sink; the file is flushed and closed on drop
pub struct FileSink {
    path: PathBuf,
    mode: WriteMode,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>, mode: WriteMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match mode {
            WriteMode::Overwrite => File::create(&path)?,
            WriteMode::Append => OpenOptions::new().create(true).append(true).open(&path)?,
        };
        tracing::debug!("Opened {} ({:?})", path.display(), mode);

        Ok(Self {
            path,
            mode,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }
}

impl LineSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}

/// Collects lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.lines.push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_sink_overwrite_then_append() {
        let tempfile = NamedTempFile::new().unwrap();
        let path = tempfile.path();
        fs::write(path, "stale\n").unwrap();

        let mut sink = FileSink::open(path, WriteMode::Overwrite).unwrap();
        sink.write_line("first").unwrap();
        sink.close().unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "first\n");

        let mut sink = FileSink::open(path, WriteMode::Append).unwrap();
        sink.write_line("second").unwrap();
        drop(sink); // closed on drop
        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_write_after_close_fails() {
        let tempfile = NamedTempFile::new().unwrap();
        let mut sink = FileSink::open(tempfile.path(), WriteMode::Overwrite).unwrap();
        sink.close().unwrap();
        assert!(matches!(sink.write_line("x"), Err(SinkError::Closed)));

        let mut mem = MemorySink::new();
        mem.close().unwrap();
        assert!(mem.write_line("x").is_err());
    }

    #[test]
    fn test_console_sink_over_buffer() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.write_line("a\tb").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), b"a\tb\n");
    }

    #[test]
    fn test_write_mode_parsing() {
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!("Overwrite".parse::<WriteMode>().unwrap(), WriteMode::Overwrite);
        assert!("truncate".parse::<WriteMode>().is_err());
    }
}
