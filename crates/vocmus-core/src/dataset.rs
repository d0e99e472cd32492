//! In-memory dataset and per-example L2 normalization

use crate::error::ClassifyError;
use crate::features::FeatureVector;
use std::path::Path;
use vocmus_data::{read_dataset_lines, ClassLabel, DatasetRecord, FEATURE_COUNT};

/// One labeled example, remembering where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub features: [f64; FEATURE_COUNT],
    pub label: ClassLabel,
    /// File name, or `<path>:<line>` of the dataset line, the example was built from
    pub source: String,
}

impl Example {
    pub fn new(features: [f64; FEATURE_COUNT], label: ClassLabel, source: impl Into<String>) -> Self {
        Self {
            features,
            label,
            source: source.into(),
        }
    }

    pub fn from_vector(vector: &FeatureVector, source: impl Into<String>) -> Self {
        Self::new(vector.values(), vector.label, source)
    }

    /// L2 norm, computed on values scaled by the largest magnitude
    pub fn norm(&self) -> f64 {
        let (scale, root) = self.scaled_norm();
        scale * root
    }

    pub fn is_zero(&self) -> bool {
        self.features.iter().all(|&v| v == 0.0)
    }

    /// `(max |v|, ||v / max |v|||)`; `(0, 0)` for the zero vector
    fn scaled_norm(&self) -> (f64, f64) {
        let scale = self.features.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if scale == 0.0 {
            return (0.0, 0.0);
        }
        let root = self
            .features
            .iter()
            .map(|v| (v / scale) * (v / scale))
            .sum::<f64>()
            .sqrt();
        (scale, root)
    }
}

/// Ordered collection of examples; order is file-selection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    examples: Vec<Example>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, example: Example) {
        self.examples.push(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }

    pub fn labels(&self) -> Vec<ClassLabel> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Number of examples per class, speech first
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for example in &self.examples {
            counts[example.label.index()] += 1;
        }
        counts
    }

    pub fn from_records(records: &[DatasetRecord]) -> Self {
        let examples = records
            .iter()
            .enumerate()
            .map(|(i, r)| Example::new(r.features, r.label, format!("record {}", i + 1)))
            .collect();
        Self { examples }
    }

    /// Load a dataset file; each example's source is `<path>:<line>`
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let examples = read_dataset_lines(path)?
            .into_iter()
            .map(|(line, r)| {
                Example::new(r.features, r.label, format!("{}:{}", path.display(), line))
            })
            .collect();
        Ok(Self { examples })
    }

    pub fn to_records(&self) -> Vec<DatasetRecord> {
        self.examples
            .iter()
            .map(|e| DatasetRecord::new(e.label, e.features))
            .collect()
    }

    /// Scale every example to unit L2 norm
    ///
    /// Fails on the first all-zero example; nothing is modified in that case.
    pub fn normalize(&mut self) -> Result<(), ClassifyError> {
        if let Some((index, example)) = self
            .examples
            .iter()
            .enumerate()
            .find(|(_, e)| e.is_zero())
        {
            return Err(ClassifyError::ZeroVector {
                index,
                origin: example.source.clone(),
            });
        }

        for example in &mut self.examples {
            let (scale, root) = example.scaled_norm();
            for v in example.features.iter_mut() {
                *v = *v / scale / root;
            }
        }
        Ok(())
    }
}

impl FromIterator<Example> for Dataset {
    fn from_iter<I: IntoIterator<Item = Example>>(iter: I) -> Self {
        Self {
            examples: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

/// Consuming form of [`Dataset::normalize`]
pub fn normalize(mut dataset: Dataset) -> Result<Dataset, ClassifyError> {
    dataset.normalize()?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample() -> Dataset {
        vec![
            Example::new([812.0, 3100.0, 0.02, 1450.0], ClassLabel::Speech, "sp1.wav"),
            Example::new([3.0, 4.0, 0.0, 0.0], ClassLabel::Music, "mu1.wav"),
            Example::new([1e-9, 2e-9, 2e-9, 0.0], ClassLabel::Music, "mu2.wav"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_normalize_gives_unit_norm() {
        let dataset = normalize(sample()).unwrap();
        for example in &dataset {
            assert_abs_diff_eq!(example.norm(), 1.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(dataset.examples()[1].features[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(dataset.examples()[1].features[1], 0.8, epsilon = 1e-12);
        assert_eq!(dataset.labels(), vec![ClassLabel::Speech, ClassLabel::Music, ClassLabel::Music]);
    }

    #[test]
    fn test_zero_vector_is_rejected() {
        let mut dataset = sample();
        dataset.push(Example::new([0.0; 4], ClassLabel::Speech, "sp_silent.wav"));
        let before = dataset.clone();

        let err = dataset.normalize().unwrap_err();
        assert_eq!(
            err,
            ClassifyError::ZeroVector {
                index: 3,
                origin: "sp_silent.wav".to_string()
            }
        );
        assert_eq!(dataset, before);
    }

    #[test]
    fn test_records_keep_order() {
        let dataset = sample();
        let records = dataset.to_records();
        let back = Dataset::from_records(&records);
        assert_eq!(back.len(), 3);
        assert_eq!(back.examples()[0].source, "record 1");
        assert_eq!(back.to_records(), records);
        assert_eq!(dataset.class_counts(), [1, 2]);
    }

    #[test]
    fn test_normalize_extreme_magnitudes() {
        let rows = [
            [1e200, 1.0, 1.0, 1.0],
            [1e-200, 0.0, 0.0, 0.0],
            [f64::MAX, f64::MAX, 0.0, -f64::MAX],
            [5e-324, 0.0, -5e-324, 0.0],
            [1e-300, 1e300, 0.0, 0.0],
        ];
        let dataset: Dataset = rows
            .iter()
            .map(|&f| Example::new(f, ClassLabel::Music, "extreme"))
            .collect();

        let dataset = normalize(dataset).unwrap();
        for example in &dataset {
            assert!(example.features.iter().all(|v| v.is_finite()));
            assert_abs_diff_eq!(example.norm(), 1.0, epsilon = 1e-12);
        }
        let e = dataset.examples();
        assert_abs_diff_eq!(e[0].features[0], 1.0, epsilon = 1e-12);
        assert_eq!(e[1].features, [1.0, 0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(e[2].features[3], -1.0 / 3f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(e[3].features[0], 1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(e[4].features[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_zero_is_zero_vector() {
        let mut dataset: Dataset = vec![Example::new([-0.0, 0.0, -0.0, 0.0], ClassLabel::Speech, "sp.wav")]
            .into_iter()
            .collect();
        assert!(matches!(
            dataset.normalize(),
            Err(ClassifyError::ZeroVector { index: 0, .. })
        ));
    }

    #[test]
    fn test_from_file_sources_name_path_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "+1 1:1 2:2 3:3 4:4\n\n-1 1:0 2:0 3:0 4:0\n").unwrap();

        let mut dataset = Dataset::from_file(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.examples()[1].source, format!("{}:3", path.display()));

        let err = dataset.normalize().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("test.txt:3"), "{}", msg);
    }
}
