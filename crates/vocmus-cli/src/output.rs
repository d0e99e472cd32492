//! JSON output formatting

use serde::Serialize;
use std::path::PathBuf;
use vocmus_core::evaluation::EvaluationReport;
use vocmus_core::pipeline::SkippedFile;

/// Result of `vmextract`
#[derive(Debug, Serialize)]
pub struct ExtractOutput {
    pub output: PathBuf,
    pub files: usize,
    pub records: usize,
    pub speech: usize,
    pub music: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Result of `vmclassify`
#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub training_examples: usize,
    pub test_examples: usize,
    pub support_vectors: usize,
    pub model: PathBuf,
    pub predictions: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
    /// Present only when ground truth was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationReport>,
}

/// Print any summary as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_output_omits_missing_evaluation() {
        let output = ClassifyOutput {
            training_examples: 4,
            test_examples: 2,
            support_vectors: 3,
            model: PathBuf::from("out/model.json"),
            predictions: PathBuf::from("out/predictions.txt"),
            report: None,
            evaluation: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["support_vectors"], 3);
        assert!(json.get("evaluation").is_none());
        assert!(json.get("report").is_none());
    }
}
