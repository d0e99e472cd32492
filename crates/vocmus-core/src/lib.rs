//! Vocmus Core - Speech/Music Clip Classification
//!
//! Extracts four features per audio clip (zero crossings, bandwidth, average
//! energy, spectral centroid), trains an RBF support-vector classifier on a
//! labeled training set and scores its predictions on a test set.

pub mod audio;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod labeling;
pub mod pipeline;
pub mod svm;
pub mod transform;

pub use config::ClassifierConfig;
pub use dataset::{normalize, Dataset, Example};
pub use error::{ClassifyError, ExtractionError, PipelineError, Stage};
pub use evaluation::{build_report, evaluate, ConfusionMatrix, EvaluationReport};
pub use features::{FeatureExtractor, FeatureVector};
pub use labeling::{Labeler, SubstringLabeler};
pub use pipeline::{classify, run, FeaturePipeline, RunConfig, RunSummary};
pub use svm::{ClassifierEngine, FixedHyperparameters, HyperparameterSelector, SmoEngine, SvmModel, SvmParameters};

use std::path::Path;

/// Extract the feature vector of one audio file
pub fn extract_features(audio_path: &Path, config: &ClassifierConfig) -> anyhow::Result<FeatureVector> {
    let pipeline = FeaturePipeline::new(config);
    let vector = pipeline
        .extract_file(audio_path)
        .map_err(|e| PipelineError::file(audio_path, e))?;
    Ok(vector)
}
