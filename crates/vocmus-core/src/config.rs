//! Classifier configuration
//!
//! Loaded from TOML; every field has a default, so an empty file (or no file)
//! reproduces the reference behaviour: 512-sample Hamming windows, raw
//! zero-crossing counts, "sp" speech marker, RBF C-SVC with C = 2.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub labeling: LabelingConfig,
    #[serde(default)]
    pub svm: SvmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which zero-crossing value becomes feature #1
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ZeroCrossingMode {
    /// Unnormalized crossing count
    #[default]
    Count,
    /// Crossings divided by sample count
    Rate,
}

/// How many FFT bins the averaged spectrum keeps
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumExtent {
    /// The ceil((N+1)/2) non-redundant bins of a real signal
    #[default]
    Unique,
    /// All N bins
    Full,
}

/// What to do when one file cannot be turned into a feature vector
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the batch at the first failing file
    #[default]
    Abort,
    /// Log the failure and leave the file out
    Skip,
}

/// Feature extraction parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_len")]
    pub window_len: usize,
    #[serde(default)]
    pub zero_crossing_mode: ZeroCrossingMode,
    #[serde(default)]
    pub spectrum: SpectrumExtent,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_len: default_window_len(),
            zero_crossing_mode: ZeroCrossingMode::default(),
            spectrum: SpectrumExtent::default(),
        }
    }
}

fn default_window_len() -> usize {
    512
}

/// Filename labeling policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelingConfig {
    /// A file whose name contains this substring is speech
    #[serde(default = "default_speech_marker")]
    pub speech_marker: String,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            speech_marker: default_speech_marker(),
        }
    }
}

fn default_speech_marker() -> String {
    "sp".to_string()
}

/// Support-vector classifier hyperparameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SvmConfig {
    #[serde(default = "default_cost")]
    pub c: f64,
    /// RBF width; `None` means 1 / feature count
    #[serde(default)]
    pub gamma: Option<f64>,
    /// Stopping tolerance on the KKT violation
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: default_cost(),
            gamma: None,
            eps: default_eps(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_cost() -> f64 {
    2.0
}
fn default_eps() -> f64 {
    1e-3
}
fn default_max_iterations() -> usize {
    100_000
}

/// Batch behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_file_error: FailurePolicy,
    /// Extract files on the rayon pool (output order is unchanged)
    #[serde(default)]
    pub parallel: bool,
}

/// Output file names, relative to the run's output directory
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_training_dataset")]
    pub training_dataset: String,
    #[serde(default = "default_test_dataset")]
    pub test_dataset: String,
    #[serde(default = "default_ground_truth")]
    pub ground_truth: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_predictions")]
    pub predictions: String,
    #[serde(default = "default_report")]
    pub report: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            training_dataset: default_training_dataset(),
            test_dataset: default_test_dataset(),
            ground_truth: default_ground_truth(),
            model: default_model(),
            predictions: default_predictions(),
            report: default_report(),
        }
    }
}

fn default_training_dataset() -> String {
    "training.txt".to_string()
}
fn default_test_dataset() -> String {
    "test.txt".to_string()
}
fn default_ground_truth() -> String {
    "groundtruth.txt".to_string()
}
fn default_model() -> String {
    "model.json".to_string()
}
fn default_predictions() -> String {
    "predictions.txt".to_string()
}
fn default_report() -> String {
    "report.txt".to_string()
}

impl ClassifierConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: ClassifierConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        let window_len = self.analysis.window_len;
        if window_len < 2 || window_len % 2 != 0 {
            anyhow::bail!("analysis.window_len must be an even number >= 2 (got {})", window_len);
        }
        if self.labeling.speech_marker.is_empty() {
            anyhow::bail!("labeling.speech_marker must not be empty");
        }
        if !(self.svm.c.is_finite() && self.svm.c > 0.0) {
            anyhow::bail!("svm.c must be > 0 (got {})", self.svm.c);
        }
        if let Some(gamma) = self.svm.gamma {
            if !(gamma.is_finite() && gamma > 0.0) {
                anyhow::bail!("svm.gamma must be > 0 (got {})", gamma);
            }
        }
        if !(self.svm.eps.is_finite() && self.svm.eps > 0.0) {
            anyhow::bail!("svm.eps must be > 0 (got {})", self.svm.eps);
        }
        if self.svm.max_iterations == 0 {
            anyhow::bail!("svm.max_iterations must be > 0");
        }
        Ok(())
    }
}
