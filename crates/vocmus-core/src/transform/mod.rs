//! Averaged magnitude spectrum
//!
//! Splits the signal into Hamming-tapered windows with 50% overlap, takes the
//! FFT magnitude of each, and averages the magnitudes bin by bin. A trailing
//! partial window is dropped.

use crate::config::{AnalysisConfig, SpectrumExtent};
use crate::error::ExtractionError;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Averaged spectrum of one file, paired with its bin frequencies
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyData {
    /// Bin centre frequencies in Hz
    pub frequencies: Vec<f64>,
    /// Mean magnitude per bin across all frames
    pub magnitudes: Vec<f64>,
    /// Number of frames averaged
    pub frame_count: usize,
}

/// Reusable analyzer; the FFT plan and taper are shared, per-call buffers are not
pub struct SpectralAnalyzer {
    window_len: usize,
    hop: usize,
    extent: SpectrumExtent,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectralAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        let window_len = config.window_len;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(window_len);

        Self {
            window_len,
            hop: window_len / 2,
            extent: config.spectrum,
            window: hamming_window(window_len),
            fft,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of bins in the averaged spectrum
    pub fn bin_count(&self) -> usize {
        match self.extent {
            SpectrumExtent::Unique => self.window_len / 2 + 1,
            SpectrumExtent::Full => self.window_len,
        }
    }

    /// Compute the averaged magnitude spectrum of `samples`
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<FrequencyData, ExtractionError> {
        let frame_count = frame_count(samples.len(), self.window_len, self.hop);
        if frame_count == 0 {
            return Err(ExtractionError::InsufficientSamples {
                available: samples.len(),
                required: self.window_len,
            });
        }

        let bins = self.bin_count();
        let scale = 2.0 / self.window_len as f64;

        let mut frame = vec![Complex::new(0.0, 0.0); self.window_len];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut sums = vec![0.0f64; bins];

        for frame_idx in 0..frame_count {
            let start = frame_idx * self.hop;
            let chunk = &samples[start..start + self.window_len];

            for ((slot, &s), &w) in frame.iter_mut().zip(chunk).zip(&self.window) {
                *slot = Complex::new(s as f64 * w, 0.0);
            }

            self.fft.process_with_scratch(&mut frame, &mut scratch);

            for (sum, bin) in sums.iter_mut().zip(&frame) {
                *sum += bin.norm() * scale;
            }
        }

        let magnitudes: Vec<f64> = sums.into_iter().map(|s| s / frame_count as f64).collect();
        let frequencies = frequency_vector(bins, self.window_len, sample_rate);

        log::trace!(
            "Averaged {} frames of {} samples into {} bins",
            frame_count,
            self.window_len,
            bins
        );

        Ok(FrequencyData {
            frequencies,
            magnitudes,
            frame_count,
        })
    }
}

/// Number of complete windows of `window_len` at `hop` that fit in `len` samples
pub fn frame_count(len: usize, window_len: usize, hop: usize) -> usize {
    if window_len == 0 || hop == 0 || len < window_len {
        return 0;
    }
    (len - window_len) / hop + 1
}

/// Symmetric Hamming window: 0.54 - 0.46 cos(2πn / (N-1))
pub fn hamming_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / (size - 1) as f64).cos())
        .collect()
}

/// Bin `k` maps to `k * sample_rate / window_len` Hz
pub fn frequency_vector(bins: usize, window_len: usize, sample_rate: u32) -> Vec<f64> {
    let bin_width = sample_rate as f64 / window_len as f64;
    (0..bins).map(|k| k as f64 * bin_width).collect()
}
