//! Per-clip feature extraction
//!
//! A clip is summarised by four numbers: average energy and zero crossings
//! from the raw samples, spectral centroid and bandwidth from the averaged
//! magnitude spectrum.

mod frequency;
mod time_domain;

pub use frequency::FrequencyFeatures;
pub use time_domain::TimeDomainFeatures;

use crate::config::{AnalysisConfig, ZeroCrossingMode};
use crate::error::ExtractionError;
use crate::transform::SpectralAnalyzer;
use serde::Serialize;
use vocmus_data::{ClassLabel, DatasetRecord, FEATURE_COUNT, FEATURE_NAMES};

/// Labeled feature vector of one clip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub avg_energy: f64,
    /// Count or rate, depending on the extractor's `ZeroCrossingMode`
    pub zero_crossing_rate: f64,
    pub spectral_centroid: f64,
    pub bandwidth: f64,
    pub label: ClassLabel,
}

impl FeatureVector {
    /// Feature values in dataset index order
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.zero_crossing_rate,
            self.bandwidth,
            self.avg_energy,
            self.spectral_centroid,
        ]
    }

    pub fn to_record(&self) -> DatasetRecord {
        DatasetRecord::new(self.label, self.values())
    }

    pub fn from_record(record: &DatasetRecord) -> Self {
        let [zero_crossing_rate, bandwidth, avg_energy, spectral_centroid] = record.features;
        Self {
            avg_energy,
            zero_crossing_rate,
            spectral_centroid,
            bandwidth,
            label: record.label,
        }
    }

    fn check_finite(&self) -> Result<(), ExtractionError> {
        for (&name, value) in FEATURE_NAMES.iter().zip(self.values()) {
            if !value.is_finite() {
                return Err(ExtractionError::NonFiniteFeature {
                    feature: name,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Turns mono samples into a `FeatureVector`
pub struct FeatureExtractor {
    analyzer: SpectralAnalyzer,
    zero_crossing_mode: ZeroCrossingMode,
}

impl FeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(config),
            zero_crossing_mode: config.zero_crossing_mode,
        }
    }

    pub fn zero_crossing_mode(&self) -> ZeroCrossingMode {
        self.zero_crossing_mode
    }

    pub fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        label: ClassLabel,
    ) -> Result<FeatureVector, ExtractionError> {
        let time = TimeDomainFeatures::compute(samples)?;
        let spectrum = self.analyzer.analyze(samples, sample_rate)?;
        let freq = FrequencyFeatures::compute(&spectrum)?;

        let vector = FeatureVector {
            avg_energy: time.avg_energy,
            zero_crossing_rate: time.zero_crossing_feature(self.zero_crossing_mode),
            spectral_centroid: freq.spectral_centroid,
            bandwidth: freq.bandwidth,
            label,
        };
        vector.check_finite()?;

        log::debug!(
            "energy={:.6} zc={} centroid={:.2}Hz bandwidth={:.2}Hz ({} frames)",
            vector.avg_energy,
            vector.zero_crossing_rate,
            vector.spectral_centroid,
            vector.bandwidth,
            spectrum.frame_count
        );

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn tone(freqs: &[f64], sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                let v: f64 = freqs.iter().map(|f| (2.0 * PI * f * t + 0.3).sin()).sum();
                (v / freqs.len() as f64) as f32
            })
            .collect()
    }

    #[test]
    fn test_values_follow_index_order() {
        let v = FeatureVector {
            avg_energy: 3.0,
            zero_crossing_rate: 1.0,
            spectral_centroid: 4.0,
            bandwidth: 2.0,
            label: ClassLabel::Speech,
        };
        assert_eq!(v.values(), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(v.to_record().encode(), "+1 1:1 2:2 3:3 4:4");
        assert_eq!(FeatureVector::from_record(&v.to_record()), v);
    }

    #[test]
    fn test_extract_tone() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default());
        let samples = tone(&[500.0, 1500.0], 8000, 8000);
        let v = extractor.extract(&samples, 8000, ClassLabel::Music).unwrap();

        assert_eq!(v.label, ClassLabel::Music);
        assert!(v.avg_energy > 0.0);
        // Default mode carries the raw crossing count
        assert!(v.zero_crossing_rate > 100.0);
        // Energy sits at 500 and 1500 Hz, centroid lands in between
        assert!(v.spectral_centroid > 500.0 && v.spectral_centroid < 1500.0);
        assert!(v.bandwidth >= 900.0 && v.bandwidth <= 1100.0);
    }

    #[test]
    fn test_rate_mode() {
        let config = AnalysisConfig {
            zero_crossing_mode: ZeroCrossingMode::Rate,
            ..AnalysisConfig::default()
        };
        let extractor = FeatureExtractor::new(&config);
        assert_eq!(extractor.zero_crossing_mode(), ZeroCrossingMode::Rate);

        let samples = tone(&[1000.0], 8000, 4000);
        let v = extractor.extract(&samples, 8000, ClassLabel::Speech).unwrap();
        // 1 kHz at 8 kHz: two crossings every eight samples
        assert_abs_diff_eq!(v.zero_crossing_rate, 0.25, epsilon = 1e-3);
    }

    #[test]
    fn test_short_clip_fails_in_spectral_stage() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default());
        let err = extractor
            .extract(&[0.1; 100], 8000, ClassLabel::Speech)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InsufficientSamples {
                available: 100,
                required: 512
            }
        );
    }

    #[test]
    fn test_silence_is_degenerate() {
        let extractor = FeatureExtractor::new(&AnalysisConfig::default());
        let err = extractor
            .extract(&[0.0; 2048], 8000, ClassLabel::Music)
            .unwrap_err();
        assert_eq!(err, ExtractionError::DegenerateSpectrum);
    }
}
