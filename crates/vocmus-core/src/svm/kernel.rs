//! Kernel functions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelType {
    /// exp(-gamma * ||a - b||²)
    #[default]
    Rbf,
}

impl KernelType {
    pub fn evaluate(self, a: &[f64], b: &[f64], gamma: f64) -> f64 {
        match self {
            KernelType::Rbf => rbf(a, b, gamma),
        }
    }
}

/// Radial basis function kernel
pub fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let dist2: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * dist2).exp()
}
