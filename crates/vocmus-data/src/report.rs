//! Final classification report file

use crate::format::{ClassLabel, GroundTruthEntry};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const REPORT_HEADER: &str = "Filename  Groundtruth  Model";

/// One test file: name, ground truth and the model's prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub filename: String,
    pub truth: ClassLabel,
    pub predicted: ClassLabel,
}

/// Summary scores. Percentages in [0, 100]; NaN when a class is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSummary {
    /// Indexed speech, music
    pub precision: [f64; 2],
    pub recall: [f64; 2],
    pub accuracy: f64,
}

#[derive(Debug, Clone)]
pub struct FinalReport {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

impl FinalReport {
    /// Render the report text
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(REPORT_HEADER);
        out.push('\n');
        // Each row is the ground-truth line followed by the prediction
        for row in &self.rows {
            let truth = GroundTruthEntry::new(row.filename.as_str(), row.truth);
            out.push_str(&format!("{}     {}\n", truth.encode(), row.predicted.name()));
        }

        let s = &self.summary;
        let lines = [
            format!("Precision values for Speech: {}%", s.precision[0]),
            format!("Precision values for Music: {}%", s.precision[1]),
            format!("Recall values for Speech: {}%", s.recall[0]),
            format!("Recall values for Music: {}%", s.recall[1]),
            format!("Accuracy of the classification: {}", s.accuracy),
        ];
        for line in lines {
            out.push('\n');
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.render().as_bytes())?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush report: {}", path.display()))?;
        Ok(())
    }
}
