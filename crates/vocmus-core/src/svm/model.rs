//! Trained model and its JSON file format

use super::kernel::KernelType;
use super::SvmType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vocmus_data::ClassLabel;

const MODEL_FORMAT_VERSION: &str = "1.0";

/// Training example with a non-zero multiplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    /// alpha * y
    pub coef: f64,
    pub features: Vec<f64>,
}

/// Two-class RBF support-vector model
///
/// The decision value is `Σ coef_i K(sv_i, x) - rho`; positive means speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmModel {
    pub svm_type: SvmType,
    pub kernel: KernelType,
    pub gamma: f64,
    pub c: f64,
    pub rho: f64,
    pub feature_count: usize,
    pub support_vectors: Vec<SupportVector>,
    /// Set when training saw only one class; every prediction is this label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_label: Option<ClassLabel>,
    #[serde(default)]
    pub iterations: usize,
}

/// On-disk wrapper with format metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub version: String,
    pub created_at: String,
    pub training_examples: usize,
    pub model: SvmModel,
}

impl SvmModel {
    pub fn decision_value(&self, features: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .map(|sv| sv.coef * self.kernel.evaluate(&sv.features, features, self.gamma))
            .sum::<f64>()
            - self.rho
    }

    /// Caller is responsible for the feature dimension
    pub fn predict_one(&self, features: &[f64]) -> ClassLabel {
        if let Some(label) = self.constant_label {
            return label;
        }
        if self.decision_value(features) > 0.0 {
            ClassLabel::Speech
        } else {
            ClassLabel::Music
        }
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path, training_examples: usize) -> Result<()> {
        let file = ModelFile {
            version: MODEL_FORMAT_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            training_examples,
            model: self.clone(),
        };
        let json_str = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json_str)
            .with_context(|| format!("Failed to write model file: {}", path.display()))?;
        log::debug!(
            "Saved model with {} support vectors to {}",
            self.support_vectors.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a model saved by [`SvmModel::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        let file: ModelFile = serde_json::from_str(&json_str)
            .with_context(|| format!("Invalid model file: {}", path.display()))?;
        if file.version != MODEL_FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported model format version {} in {}",
                file.version,
                path.display()
            );
        }
        Ok(file.model)
    }
}
