//! vocmus file formats: datasets, ground truth, predictions, reports

pub mod format;
pub mod reader;
pub mod report;
pub mod writer;

pub use format::{
    ClassLabel, DatasetRecord, FormatError, GroundTruthEntry, FEATURE_COUNT, FEATURE_NAMES,
};
pub use reader::{read_dataset, read_dataset_lines, read_ground_truth, read_predictions};
pub use report::{FinalReport, ReportRow, ReportSummary, REPORT_HEADER};
pub use writer::{write_dataset, write_predictions, DatasetWriter, GroundTruthWriter};
