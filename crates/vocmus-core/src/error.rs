//! Error taxonomy for extraction, classification and pipeline runs

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage in which a per-file failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Decode,
    TimeDomain,
    Spectral,
    FrequencyDomain,
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Decode => "decode",
            Stage::TimeDomain => "time-domain",
            Stage::Spectral => "spectral",
            Stage::FrequencyDomain => "frequency-domain",
            Stage::Encode => "encode",
        };
        f.write_str(name)
    }
}

/// Failures while turning one file into a feature vector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("no samples to analyse")]
    EmptyInput,

    #[error("insufficient samples: {available} available, one analysis window needs {required}")]
    InsufficientSamples { available: usize, required: usize },

    #[error("degenerate spectrum: total magnitude is zero")]
    DegenerateSpectrum,

    #[error("no frequency bin exceeds the average magnitude")]
    NoSignificantBand,

    #[error("feature {feature} is not finite ({value})")]
    NonFiniteFeature { feature: &'static str, value: f64 },
}

impl ExtractionError {
    pub fn stage(&self) -> Stage {
        match self {
            ExtractionError::Decode(_) => Stage::Decode,
            ExtractionError::EmptyInput => Stage::TimeDomain,
            ExtractionError::InsufficientSamples { .. } => Stage::Spectral,
            ExtractionError::DegenerateSpectrum | ExtractionError::NoSignificantBand => {
                Stage::FrequencyDomain
            }
            ExtractionError::NonFiniteFeature { .. } => Stage::Encode,
        }
    }
}

/// Failures in normalization, training, prediction and scoring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("example {index} ({origin}) is the zero vector and cannot be normalized")]
    ZeroVector { index: usize, origin: String },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("length mismatch: {expected} ground-truth labels but {actual} predictions")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("feature dimension mismatch: model expects {expected}, example {index} has {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid SVM parameters: {0}")]
    InvalidParameters(String),

    #[error("{set} set: {source}")]
    InSet {
        set: &'static str,
        #[source]
        source: Box<ClassifyError>,
    },
}

impl ClassifyError {
    /// Tag an error with the dataset ("training", "test") it came from
    pub fn in_set(self, set: &'static str) -> Self {
        ClassifyError::InSet {
            set,
            source: Box::new(self),
        }
    }
}

/// Failures of a whole batch
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{}: {stage} stage failed: {source}", path.display())]
    File {
        path: PathBuf,
        stage: Stage,
        #[source]
        source: ExtractionError,
    },

    #[error("no usable {set} files ({attempted} given)")]
    NoUsableFiles { set: &'static str, attempted: usize },

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: ExtractionError) -> Self {
        PipelineError::File {
            path: path.into(),
            stage: source.stage(),
            source,
        }
    }
}
