//! Confusion matrix and precision/recall scoring

use crate::error::ClassifyError;
use serde::Serialize;
use vocmus_data::{ClassLabel, FinalReport, GroundTruthEntry, ReportRow, ReportSummary};

/// 2×2 counts, rows = ground truth, columns = prediction, speech first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_labels(truth: &[ClassLabel], predicted: &[ClassLabel]) -> Result<Self, ClassifyError> {
        if truth.len() != predicted.len() {
            return Err(ClassifyError::LengthMismatch {
                expected: truth.len(),
                actual: predicted.len(),
            });
        }
        let mut matrix = Self::default();
        for (t, p) in truth.iter().zip(predicted) {
            matrix.counts[t.index()][p.index()] += 1;
        }
        Ok(matrix)
    }

    pub fn get(&self, truth: ClassLabel, predicted: ClassLabel) -> usize {
        self.counts[truth.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        self.counts[0][0] + self.counts[1][1]
    }

    /// Percentage of predictions of `class` that were right
    pub fn precision(&self, class: ClassLabel) -> f64 {
        let k = class.index();
        let predicted_as_class = self.counts[0][k] + self.counts[1][k];
        percentage(self.counts[k][k], predicted_as_class)
    }

    /// Percentage of files of `class` that were found
    pub fn recall(&self, class: ClassLabel) -> f64 {
        let k = class.index();
        let actually_class = self.counts[k][0] + self.counts[k][1];
        percentage(self.counts[k][k], actually_class)
    }

    pub fn accuracy(&self) -> f64 {
        percentage(self.correct(), self.total())
    }
}

/// 0/0 is NaN on purpose: an absent class has no score
fn percentage(numerator: usize, denominator: usize) -> f64 {
    100.0 * numerator as f64 / denominator as f64
}

/// Scores of one evaluation, percentages indexed speech, music
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub matrix: ConfusionMatrix,
    pub precision: [f64; 2],
    pub recall: [f64; 2],
    pub accuracy: f64,
}

impl EvaluationReport {
    pub fn from_matrix(matrix: ConfusionMatrix) -> Self {
        Self {
            matrix,
            precision: [
                matrix.precision(ClassLabel::Speech),
                matrix.precision(ClassLabel::Music),
            ],
            recall: [
                matrix.recall(ClassLabel::Speech),
                matrix.recall(ClassLabel::Music),
            ],
            accuracy: matrix.accuracy(),
        }
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            precision: self.precision,
            recall: self.recall,
            accuracy: self.accuracy,
        }
    }
}

/// Build the confusion matrix from predictions and ground truth
pub fn evaluate(predicted: &[ClassLabel], truth: &[ClassLabel]) -> Result<ConfusionMatrix, ClassifyError> {
    ConfusionMatrix::from_labels(truth, predicted)
}

/// Join ground truth and predictions by position into the final report
pub fn build_report(
    ground_truth: &[GroundTruthEntry],
    predictions: &[ClassLabel],
) -> Result<(FinalReport, EvaluationReport), ClassifyError> {
    let truth: Vec<ClassLabel> = ground_truth.iter().map(|e| e.label).collect();
    let matrix = evaluate(predictions, &truth)?;
    let scores = EvaluationReport::from_matrix(matrix);

    let rows = ground_truth
        .iter()
        .zip(predictions)
        .map(|(entry, &predicted)| ReportRow {
            filename: entry.filename.clone(),
            truth: entry.label,
            predicted,
        })
        .collect();

    Ok((
        FinalReport {
            rows,
            summary: scores.summary(),
        },
        scores,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClassLabel::{Music, Speech};

    #[test]
    fn test_perfect_two_file_run() {
        let matrix = evaluate(&[Speech, Music], &[Speech, Music]).unwrap();
        assert_eq!(matrix.counts, [[1, 0], [0, 1]]);

        let scores = EvaluationReport::from_matrix(matrix);
        assert_eq!(scores.precision, [100.0, 100.0]);
        assert_eq!(scores.recall, [100.0, 100.0]);
        assert_eq!(scores.accuracy, 100.0);
    }

    #[test]
    fn test_speech_all_predicted_as_music() {
        let matrix = evaluate(&[Music, Music], &[Speech, Speech]).unwrap();
        assert_eq!(matrix.counts, [[0, 2], [0, 0]]);

        let scores = EvaluationReport::from_matrix(matrix);
        assert!(scores.precision[0].is_nan());
        assert_eq!(scores.precision[1], 0.0);
        assert_eq!(scores.recall[0], 0.0);
        assert!(scores.recall[1].is_nan());
        assert_eq!(scores.accuracy, 0.0);
    }

    #[test]
    fn test_axes_are_truth_then_prediction() {
        let truth = [Speech, Speech, Speech, Music, Music];
        let predicted = [Speech, Speech, Music, Speech, Music];
        let matrix = evaluate(&predicted, &truth).unwrap();
        assert_eq!(matrix.get(Speech, Music), 1);
        assert_eq!(matrix.get(Music, Speech), 1);
        assert_eq!(matrix.total(), 5);

        // 2 of 3 speech predictions right, 2 of 3 speech files found
        let precision = matrix.precision(Speech);
        assert!((precision - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(matrix.recall(Music), 50.0);
        assert_eq!(matrix.accuracy(), 60.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = evaluate(&[Speech], &[Speech, Music]).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_build_report_joins_by_position() {
        let truth = vec![
            GroundTruthEntry::new("sp1.wav", Speech),
            GroundTruthEntry::new("mu1.wav", Music),
        ];
        let (report, scores) = build_report(&truth, &[Speech, Speech]).unwrap();
        assert_eq!(report.rows[1].filename, "mu1.wav");
        assert_eq!(report.rows[1].truth, Music);
        assert_eq!(report.rows[1].predicted, Speech);
        assert_eq!(scores.precision[0], 50.0);
        assert!(scores.precision[1].is_nan());

        let text = report.render();
        assert!(text.contains("mu1.wav   Music       Speech"));
        assert!(text.contains("Precision values for Music: NaN%"));
        assert!(text.contains("Accuracy of the classification: 50"));

        assert!(build_report(&truth, &[Speech]).is_err());
    }
}
