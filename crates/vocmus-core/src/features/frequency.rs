//! Frequency-domain descriptors of an averaged spectrum

use crate::error::ExtractionError;
use crate::transform::FrequencyData;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyFeatures {
    /// Magnitude-weighted mean frequency in Hz
    pub spectral_centroid: f64,
    /// Distance in Hz between the lowest and highest bin above the mean magnitude
    pub bandwidth: f64,
    /// Mean magnitude over all bins
    pub avg_magnitude: f64,
}

impl FrequencyFeatures {
    pub fn compute(data: &FrequencyData) -> Result<Self, ExtractionError> {
        let magnitudes = &data.magnitudes;
        let frequencies = &data.frequencies;
        debug_assert_eq!(magnitudes.len(), frequencies.len());

        let total: f64 = magnitudes.iter().sum();
        if magnitudes.is_empty() || total == 0.0 {
            return Err(ExtractionError::DegenerateSpectrum);
        }

        let weighted: f64 = magnitudes
            .iter()
            .zip(frequencies)
            .map(|(&m, &f)| m * f)
            .sum();
        let spectral_centroid = weighted / total;
        let avg_magnitude = total / magnitudes.len() as f64;

        let mut band: Option<(f64, f64)> = None;
        for (&m, &f) in magnitudes.iter().zip(frequencies) {
            if m > avg_magnitude {
                band = Some(match band {
                    Some((lo, hi)) => (lo.min(f), hi.max(f)),
                    None => (f, f),
                });
            }
        }
        let (lo, hi) = band.ok_or(ExtractionError::NoSignificantBand)?;

        Ok(Self {
            spectral_centroid,
            bandwidth: hi - lo,
            avg_magnitude,
        })
    }
}
