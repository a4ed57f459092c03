//! Audio analysis configuration.

use std::ops::Range;

use crate::audio::AudioError;

/// Spectrum analyzer parameters.
///
/// Defaults mirror a browser analyser node: 256-point FFT at 44.1 kHz,
/// decibel window [-100, -30] and smoothing 0.8. The band edges reproduce
/// bins 0..10 (bass), 10..40 (mid) and 40..80 (treble) at that size.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    pub fft_size: usize,

    /// Analysis update interval (milliseconds)
    pub update_interval_ms: u64,

    /// Magnitude mapped to 0.0 (dBFS)
    pub min_db: f32,

    /// Magnitude mapped to 1.0 (dBFS)
    pub max_db: f32,

    /// Exponential smoothing of bin magnitudes between frames (0 = none, <1)
    pub smoothing: f32,

    /// Bass frequency range (Hz)
    pub bass_range_hz: (f32, f32),

    /// Mid frequency range (Hz)
    pub mid_range_hz: (f32, f32),

    /// Treble frequency range (Hz)
    pub treble_range_hz: (f32, f32),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 256,
            update_interval_ms: 16, // ~60 Hz, one analysis per frame
            min_db: -100.0,
            max_db: -30.0,
            smoothing: 0.8,
            bass_range_hz: (0.0, 1723.0),
            mid_range_hz: (1723.0, 6891.0),
            treble_range_hz: (6891.0, 13782.0),
        }
    }
}

impl AnalyzerConfig {
    /// Number of spectrum bins published per snapshot (half the FFT size)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Convert frequency (Hz) to FFT bin index, capped at `bin_count`
    pub fn hz_to_bin(&self, hz: f32) -> usize {
        let bin = ((hz.max(0.0) * self.fft_size as f32) / self.sample_rate_hz as f32) as usize;
        bin.min(self.bin_count())
    }

    /// Get FFT bin range for bass frequencies
    pub fn bass_bins(&self) -> Range<usize> {
        self.hz_to_bin(self.bass_range_hz.0)..self.hz_to_bin(self.bass_range_hz.1)
    }

    /// Get FFT bin range for mid frequencies
    pub fn mid_bins(&self) -> Range<usize> {
        self.hz_to_bin(self.mid_range_hz.0)..self.hz_to_bin(self.mid_range_hz.1)
    }

    /// Get FFT bin range for treble frequencies
    pub fn treble_bins(&self) -> Range<usize> {
        self.hz_to_bin(self.treble_range_hz.0)..self.hz_to_bin(self.treble_range_hz.1)
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), AudioError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 4 {
            return Err(AudioError::InvalidConfig(format!(
                "FFT size must be a power of 2 and at least 4, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(AudioError::InvalidConfig(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if !(self.min_db < self.max_db) {
            return Err(AudioError::InvalidConfig(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(AudioError::InvalidConfig(format!(
                "Smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_band_bins() {
        let config = AnalyzerConfig::default();

        // 44100 / 256 ≈ 172.3 Hz per bin
        assert_eq!(config.bass_bins(), 0..10);
        assert_eq!(config.mid_bins(), 10..40);
        assert_eq!(config.treble_bins(), 40..80);
        assert_eq!(config.bin_count(), 128);
    }

    #[test]
    fn test_hz_to_bin_caps_at_nyquist() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.hz_to_bin(96_000.0), 128);
        assert_eq!(config.hz_to_bin(-5.0), 0);
    }

    #[test]
    fn test_validate() {
        assert!(AnalyzerConfig::default().validate().is_ok());

        let mut config = AnalyzerConfig::default();
        config.fft_size = 300;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.min_db = -10.0;
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.smoothing = 1.0;
        assert!(config.validate().is_err());
    }
}
