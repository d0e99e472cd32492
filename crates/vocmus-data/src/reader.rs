//! Readers for dataset, ground-truth and prediction files

use crate::format::{ClassLabel, DatasetRecord, GroundTruthEntry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read a dataset file. Blank lines are ignored.
pub fn read_dataset(path: &Path) -> Result<Vec<DatasetRecord>> {
    let reader = open(path)?;
    parse_lines(reader, path, DatasetRecord::parse)
}

/// Read a dataset file, pairing each record with its 1-based line number
pub fn read_dataset_lines(path: &Path) -> Result<Vec<(usize, DatasetRecord)>> {
    let reader = open(path)?;
    parse_numbered_lines(reader, path, DatasetRecord::parse)
}

/// Read a ground-truth file. Blank lines are ignored.
pub fn read_ground_truth(path: &Path) -> Result<Vec<GroundTruthEntry>> {
    let reader = open(path)?;
    parse_lines(reader, path, GroundTruthEntry::parse)
}

/// Read a prediction file (one `+1`/`-1` per line)
pub fn read_predictions(path: &Path) -> Result<Vec<ClassLabel>> {
    let reader = open(path)?;
    parse_lines(reader, path, |line| {
        let token = line.trim();
        token
            .parse::<f64>()
            .ok()
            .and_then(ClassLabel::from_value)
            .ok_or_else(|| crate::FormatError::InvalidLabel(token.to_string()))
    })
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn parse_lines<R, T, F>(reader: R, path: &Path, parse: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: Fn(&str) -> Result<T, crate::FormatError>,
{
    let items = parse_numbered_lines(reader, path, parse)?;
    Ok(items.into_iter().map(|(_, item)| item).collect())
}

fn parse_numbered_lines<R, T, F>(reader: R, path: &Path, parse: F) -> Result<Vec<(usize, T)>>
where
    R: BufRead,
    F: Fn(&str) -> Result<T, crate::FormatError>,
{
    let mut items = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let item = parse(&line)
            .with_context(|| format!("{}:{}: invalid line", path.display(), line_idx + 1))?;
        items.push((line_idx + 1, item));
    }
    Ok(items)
}
