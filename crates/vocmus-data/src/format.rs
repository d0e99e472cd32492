//! Sparse-index dataset line format
//!
//! One example per line: `<label> 1:<f1> 2:<f2> 3:<f3> 4:<f4>`, where the
//! label is `+1` (speech) or `-1` (music) and the four feature indices are
//! always present.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of features carried by every record
pub const FEATURE_COUNT: usize = 4;

/// Feature names in index order (index 1 first)
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "zero_crossing_rate",
    "bandwidth",
    "avg_energy",
    "spectral_centroid",
];

/// Binary class of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    Speech,
    Music,
}

impl ClassLabel {
    /// Numeric label used in dataset and prediction files
    pub fn value(self) -> i8 {
        match self {
            ClassLabel::Speech => 1,
            ClassLabel::Music => -1,
        }
    }

    /// Map a numeric label back; only +1 and -1 are valid
    pub fn from_value(value: f64) -> Option<Self> {
        if value == 1.0 {
            Some(ClassLabel::Speech)
        } else if value == -1.0 {
            Some(ClassLabel::Music)
        } else {
            None
        }
    }

    /// Row/column index in a confusion matrix (speech first)
    pub fn index(self) -> usize {
        match self {
            ClassLabel::Speech => 0,
            ClassLabel::Music => 1,
        }
    }

    /// Human-readable name used in ground-truth and report files
    pub fn name(self) -> &'static str {
        match self {
            ClassLabel::Speech => "Speech",
            ClassLabel::Music => "Music",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Speech" => Some(ClassLabel::Speech),
            "Music" => Some(ClassLabel::Music),
            _ => None,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Speech => f.write_str("+1"),
            ClassLabel::Music => f.write_str("-1"),
        }
    }
}

/// Line-level parse failures
#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("empty line")]
    EmptyLine,

    #[error("invalid label '{0}' (expected +1 or -1)")]
    InvalidLabel(String),

    #[error("malformed feature token '{0}' (expected <index>:<value>)")]
    MalformedToken(String),

    #[error("feature index {0} out of range 1..={}", FEATURE_COUNT)]
    IndexOutOfRange(usize),

    #[error("feature index {0} appears more than once")]
    DuplicateIndex(usize),

    #[error("feature index {0} is missing")]
    MissingIndex(usize),

    #[error("non-finite feature value at index {0}")]
    NonFinite(usize),

    #[error("malformed ground-truth line '{0}'")]
    MalformedGroundTruth(String),
}

/// One labeled example as stored on disk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetRecord {
    pub label: ClassLabel,
    /// Values for indices 1..=4, in index order
    pub features: [f64; FEATURE_COUNT],
}

impl DatasetRecord {
    pub fn new(label: ClassLabel, features: [f64; FEATURE_COUNT]) -> Self {
        Self { label, features }
    }

    /// Encode as a dataset line (without trailing newline)
    pub fn encode(&self) -> String {
        let mut line = self.label.to_string();
        for (i, value) in self.features.iter().enumerate() {
            // `{}` on f64 is the shortest representation that parses back exactly
            line.push_str(&format!(" {}:{}", i + 1, value));
        }
        line
    }

    /// Parse a dataset line
    pub fn parse(line: &str) -> Result<Self, FormatError> {
        let mut tokens = line.split_whitespace();
        let label_token = tokens.next().ok_or(FormatError::EmptyLine)?;
        let label = label_token
            .parse::<f64>()
            .ok()
            .and_then(ClassLabel::from_value)
            .ok_or_else(|| FormatError::InvalidLabel(label_token.to_string()))?;

        let mut features = [0.0; FEATURE_COUNT];
        let mut seen = [false; FEATURE_COUNT];

        for token in tokens {
            let (index, value) = token
                .split_once(':')
                .ok_or_else(|| FormatError::MalformedToken(token.to_string()))?;
            let index: usize = index
                .parse()
                .map_err(|_| FormatError::MalformedToken(token.to_string()))?;
            let value: f64 = value
                .parse()
                .map_err(|_| FormatError::MalformedToken(token.to_string()))?;

            if index == 0 || index > FEATURE_COUNT {
                return Err(FormatError::IndexOutOfRange(index));
            }
            if seen[index - 1] {
                return Err(FormatError::DuplicateIndex(index));
            }
            if !value.is_finite() {
                return Err(FormatError::NonFinite(index));
            }
            seen[index - 1] = true;
            features[index - 1] = value;
        }

        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(FormatError::MissingIndex(missing + 1));
        }

        Ok(Self { label, features })
    }
}

/// Ground-truth entry: file name and its class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthEntry {
    pub filename: String,
    pub label: ClassLabel,
}

impl GroundTruthEntry {
    pub fn new(filename: impl Into<String>, label: ClassLabel) -> Self {
        Self {
            filename: filename.into(),
            label,
        }
    }

    /// `<filename>   <Speech|Music>  `
    pub fn encode(&self) -> String {
        format!("{}   {}  ", self.filename, self.label.name())
    }

    /// The label is the last whitespace-separated token; everything before it
    /// (trimmed) is the file name, so names containing spaces survive.
    pub fn parse(line: &str) -> Result<Self, FormatError> {
        let trimmed = line.trim();
        let (filename, label) = trimmed
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| FormatError::MalformedGroundTruth(line.to_string()))?;
        let label = ClassLabel::from_name(label)
            .ok_or_else(|| FormatError::MalformedGroundTruth(line.to_string()))?;
        let filename = filename.trim_end();
        if filename.is_empty() {
            return Err(FormatError::MalformedGroundTruth(line.to_string()));
        }
        Ok(Self::new(filename, label))
    }
}
