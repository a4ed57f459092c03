//! Spectrum analysis: window, FFT, decibel mapping, band averages.

use std::f32::consts::PI;
use std::ops::Range;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::{AudioError, AudioSnapshot};
use crate::params::AnalyzerConfig;

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Stateful analyzer turning sample blocks into [`AudioSnapshot`]s.
///
/// Bin magnitudes are smoothed across calls, so feed it consecutive blocks
/// of the same stream.
pub struct FeatureExtractor {
    config: AnalyzerConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl FeatureExtractor {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AudioError> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| hann_window(i, config.fft_size))
            .collect();

        Ok(Self {
            buffer: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.bin_count()],
            fft,
            window,
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze the most recent `fft_size` samples of `samples`.
    ///
    /// Shorter input is zero-padded at the front.
    pub fn analyze(&mut self, samples: &[f32]) -> AudioSnapshot {
        let size = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(size)..];
        let pad = size - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            let sample = if sample.is_finite() { sample } else { 0.0 };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let scale = 1.0 / size as f32;
        let tau = self.config.smoothing;
        let min_db = self.config.min_db;
        let range_db = self.config.max_db - min_db;

        let spectrum: Vec<f32> = self
            .smoothed
            .iter_mut()
            .zip(self.buffer.iter())
            .map(|(smoothed, bin)| {
                *smoothed = tau * *smoothed + (1.0 - tau) * bin.norm() * scale;
                if *smoothed <= 0.0 {
                    return 0.0;
                }
                let db = 20.0 * smoothed.log10();
                ((db - min_db) / range_db).clamp(0.0, 1.0)
            })
            .collect();

        AudioSnapshot {
            bass: band_mean(&spectrum, self.config.bass_bins()),
            mid: band_mean(&spectrum, self.config.mid_bins()),
            treble: band_mean(&spectrum, self.config.treble_bins()),
            volume: band_mean(&spectrum, 0..spectrum.len()),
            spectrum,
        }
    }

    /// Forget smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }
}

fn band_mean(spectrum: &[f32], bins: Range<usize>) -> f32 {
    let bins = bins.start.min(spectrum.len())..bins.end.min(spectrum.len());
    if bins.is_empty() {
        return 0.0;
    }
    spectrum[bins.clone()].iter().sum::<f32>() / bins.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq_hz: f32, amplitude: f32, config: &AnalyzerConfig) -> Vec<f32> {
        (0..config.fft_size)
            .map(|i| {
                let t = i as f32 / config.sample_rate_hz as f32;
                (2.0 * PI * freq_hz * t).sin() * amplitude
            })
            .collect()
    }

    #[test]
    fn test_hann_window_shape() {
        assert!(hann_window(0, 256).abs() < 1e-6);
        assert!(hann_window(255, 256).abs() < 1e-6);
        // Peak near the middle
        assert!(hann_window(128, 256) > 0.99);
    }

    #[test]
    fn test_silence_maps_to_zero() {
        let mut extractor = FeatureExtractor::new(AnalyzerConfig::default()).unwrap();
        let snapshot = extractor.analyze(&[0.0; 256]);
        assert_eq!(snapshot.volume, 0.0);
        assert_eq!(snapshot.bass, 0.0);
        assert_eq!(snapshot.spectrum.len(), 128);
        assert!(snapshot.spectrum.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_low_tone_lands_in_bass() {
        let config = AnalyzerConfig::default();
        let samples = tone(500.0, 1.0, &config);
        let mut extractor = FeatureExtractor::new(config).unwrap();

        // Let smoothing settle
        let mut snapshot = extractor.analyze(&samples);
        for _ in 0..30 {
            snapshot = extractor.analyze(&samples);
        }

        assert!(snapshot.bass > 0.5, "bass {}", snapshot.bass);
        assert!(snapshot.bass > snapshot.mid);
        assert!(snapshot.treble < 0.05, "treble {}", snapshot.treble);
    }

    #[test]
    fn test_output_stays_normalized() {
        let config = AnalyzerConfig::default();
        let samples = tone(3000.0, 100.0, &config);
        let mut extractor = FeatureExtractor::new(config).unwrap();
        let s = extractor.analyze(&samples);

        for v in [s.bass, s.mid, s.treble, s.volume] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(s.spectrum.iter().all(|b| (0.0..=1.0).contains(b)));
    }

    #[test]
    fn test_short_input_is_padded() {
        let mut extractor = FeatureExtractor::new(AnalyzerConfig::default()).unwrap();
        let s = extractor.analyze(&[0.5; 10]);
        assert_eq!(s.spectrum.len(), 128);
        assert!(s.volume.is_finite());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalyzerConfig::default();
        config.fft_size = 100;
        assert!(FeatureExtractor::new(config).is_err());
    }
}
