//! Time-domain descriptors: average energy and zero crossings

use crate::config::ZeroCrossingMode;
use crate::error::ExtractionError;

/// Time-domain features of one sample sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeDomainFeatures {
    /// Mean of sample² (not RMS)
    pub avg_energy: f64,
    /// Number of sign changes
    pub zero_crossings: u64,
    /// `zero_crossings / sample_count`
    pub zero_crossing_rate: f64,
    pub sample_count: usize,
}

impl TimeDomainFeatures {
    pub fn compute(samples: &[f32]) -> Result<Self, ExtractionError> {
        if samples.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        let sample_count = samples.len();

        let energy_sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let avg_energy = energy_sum / sample_count as f64;

        // sign is +1 for s >= 0, -1 otherwise; each adjacent pair contributes 0 or 2
        let sign = |s: f32| if s >= 0.0 { 1i64 } else { -1i64 };
        let total: i64 = samples
            .windows(2)
            .map(|pair| (sign(pair[0]) - sign(pair[1])).abs())
            .sum();
        let zero_crossings = ((total + 1) / 2) as u64;

        Ok(Self {
            avg_energy,
            zero_crossings,
            zero_crossing_rate: zero_crossings as f64 / sample_count as f64,
            sample_count,
        })
    }

    /// The zero-crossing value that goes into feature #1
    pub fn zero_crossing_feature(&self, mode: ZeroCrossingMode) -> f64 {
        match mode {
            ZeroCrossingMode::Count => self.zero_crossings as f64,
            ZeroCrossingMode::Rate => self.zero_crossing_rate,
        }
    }
}
