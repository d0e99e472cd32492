//! Line-oriented writers for dataset, ground-truth and prediction files
//!
//! Each writer opens its file once, buffers writes, and must be closed with
//! `finish()` to surface flush errors. A writer dropped early (error path)
//! still flushes through `BufWriter`'s drop, best effort.

use crate::format::{ClassLabel, DatasetRecord, GroundTruthEntry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered text file written one line at a time
struct LineSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl LineSink {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        self.lines += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<usize> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        log::debug!("Wrote {} lines to {}", self.lines, self.path.display());
        Ok(self.lines)
    }
}

/// Writer for sparse-index dataset files
pub struct DatasetWriter {
    sink: LineSink,
}

impl DatasetWriter {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            sink: LineSink::create(path)?,
        })
    }

    pub fn write_record(&mut self, record: &DatasetRecord) -> Result<()> {
        self.sink.write_line(&record.encode())
    }

    /// Flush and close; returns the number of records written
    pub fn finish(self) -> Result<usize> {
        self.sink.finish()
    }
}

/// Writer for the ground-truth file of a test set
pub struct GroundTruthWriter {
    sink: LineSink,
}

impl GroundTruthWriter {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            sink: LineSink::create(path)?,
        })
    }

    pub fn write_entry(&mut self, entry: &GroundTruthEntry) -> Result<()> {
        self.sink.write_line(&entry.encode())
    }

    pub fn finish(self) -> Result<usize> {
        self.sink.finish()
    }
}

/// Write one predicted label per line
pub fn write_predictions(path: &Path, predictions: &[ClassLabel]) -> Result<()> {
    let mut sink = LineSink::create(path)?;
    for label in predictions {
        sink.write_line(&label.to_string())?;
    }
    sink.finish()?;
    Ok(())
}

/// Write a whole dataset in one go
pub fn write_dataset(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    let mut writer = DatasetWriter::create(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()?;
    Ok(())
}
