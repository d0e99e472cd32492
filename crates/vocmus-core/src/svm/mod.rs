//! Support-vector classification
//!
//! C-SVC with an RBF kernel, trained by SMO. The engine sits behind
//! [`ClassifierEngine`] so the pipeline does not depend on the solver.

mod kernel;
mod model;
mod smo;


pub use kernel::{rbf, KernelType};
pub use model::{ModelFile, SupportVector, SvmModel};

use crate::config::SvmConfig;
use crate::dataset::Dataset;
use crate::error::ClassifyError;
use serde::{Deserialize, Serialize};
use vocmus_data::{ClassLabel, FEATURE_COUNT};

/// Multipliers at or below this are not kept as support vectors
const ALPHA_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SvmType {
    /// Soft-margin classification with cost C
    #[default]
    CSvc,
}

/// Resolved training parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SvmParameters {
    pub svm_type: SvmType,
    pub kernel: KernelType,
    pub c: f64,
    pub gamma: f64,
    pub eps: f64,
    pub max_iterations: usize,
}

impl SvmParameters {
    /// Resolve `config`; an unset gamma becomes `1 / feature_count`
    pub fn from_config(config: &SvmConfig, feature_count: usize) -> Self {
        Self {
            svm_type: SvmType::CSvc,
            kernel: KernelType::Rbf,
            c: config.c,
            gamma: config
                .gamma
                .unwrap_or(1.0 / feature_count.max(1) as f64),
            eps: config.eps,
            max_iterations: config.max_iterations,
        }
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.c) {
            return Err(ClassifyError::InvalidParameters(format!("C must be > 0, got {}", self.c)));
        }
        if !positive(self.gamma) {
            return Err(ClassifyError::InvalidParameters(format!(
                "gamma must be > 0, got {}",
                self.gamma
            )));
        }
        if !positive(self.eps) {
            return Err(ClassifyError::InvalidParameters(format!(
                "eps must be > 0, got {}",
                self.eps
            )));
        }
        if self.max_iterations == 0 {
            return Err(ClassifyError::InvalidParameters(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SvmParameters {
    fn default() -> Self {
        Self::from_config(&SvmConfig::default(), FEATURE_COUNT)
    }
}

/// Trains models and applies them
pub trait ClassifierEngine {
    fn train(&self, training: &Dataset, params: &SvmParameters) -> Result<SvmModel, ClassifyError>;

    fn predict(&self, model: &SvmModel, test: &Dataset) -> Result<Vec<ClassLabel>, ClassifyError>;
}

/// Picks training parameters for a dataset
pub trait HyperparameterSelector {
    fn select(&self, training: &Dataset) -> SvmParameters;
}

/// Always returns the same parameters
#[derive(Debug, Clone)]
pub struct FixedHyperparameters {
    params: SvmParameters,
}

impl FixedHyperparameters {
    pub fn new(params: SvmParameters) -> Self {
        Self { params }
    }

    pub fn from_config(config: &SvmConfig) -> Self {
        Self::new(SvmParameters::from_config(config, FEATURE_COUNT))
    }
}

impl HyperparameterSelector for FixedHyperparameters {
    fn select(&self, _training: &Dataset) -> SvmParameters {
        self.params.clone()
    }
}

/// In-process SMO solver
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoEngine;

impl ClassifierEngine for SmoEngine {
    fn train(&self, training: &Dataset, params: &SvmParameters) -> Result<SvmModel, ClassifyError> {
        params.validate()?;
        if training.is_empty() {
            return Err(ClassifyError::EmptyDataset);
        }

        let mut model = SvmModel {
            svm_type: params.svm_type,
            kernel: params.kernel,
            gamma: params.gamma,
            c: params.c,
            rho: 0.0,
            feature_count: FEATURE_COUNT,
            support_vectors: Vec::new(),
            constant_label: None,
            iterations: 0,
        };

        let [speech, music] = training.class_counts();
        if speech == 0 || music == 0 {
            let label = if speech > 0 { ClassLabel::Speech } else { ClassLabel::Music };
            log::warn!(
                "Training set has only {} examples; every prediction will be {}",
                label.name(),
                label.name()
            );
            model.constant_label = Some(label);
            return Ok(model);
        }

        let x: Vec<Vec<f64>> = training.iter().map(|e| e.features.to_vec()).collect();
        let y: Vec<f64> = training.iter().map(|e| e.label.value() as f64).collect();

        let solution = smo::Problem {
            x: &x,
            y: &y,
            kernel: params.kernel,
            gamma: params.gamma,
            c: params.c,
            eps: params.eps,
            max_iterations: params.max_iterations,
        }
        .solve();

        model.rho = solution.rho;
        model.iterations = solution.iterations;
        model.support_vectors = solution
            .alpha
            .iter()
            .zip(x.into_iter().zip(&y))
            .filter(|(a, _)| **a > ALPHA_EPSILON)
            .map(|(&a, (features, &yi))| SupportVector {
                coef: a * yi,
                features,
            })
            .collect();

        log::info!(
            "Trained C-SVC on {} examples ({} speech, {} music): {} support vectors, {} iterations{}",
            training.len(),
            speech,
            music,
            model.support_vectors.len(),
            solution.iterations,
            if solution.converged { "" } else { " (not converged)" }
        );

        Ok(model)
    }

    fn predict(&self, model: &SvmModel, test: &Dataset) -> Result<Vec<ClassLabel>, ClassifyError> {
        test.iter()
            .enumerate()
            .map(|(index, example)| {
                if example.features.len() != model.feature_count {
                    return Err(ClassifyError::DimensionMismatch {
                        index,
                        expected: model.feature_count,
                        actual: example.features.len(),
                    });
                }
                Ok(model.predict_one(&example.features))
            })
            .collect()
    }
}
