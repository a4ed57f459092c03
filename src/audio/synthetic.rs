//! Deterministic stand-in for live audio.

use super::AudioSnapshot;

/// Spectrum length of synthetic snapshots
pub const SYNTHETIC_SPECTRUM_BINS: usize = 128;

/// Slow sine-driven features, used when no real input is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }

    /// Features at time `t` (seconds).
    pub fn snapshot_at(&self, t: f32) -> AudioSnapshot {
        let unit = |x: f32| (x.sin() + 1.0) / 2.0;

        let spectrum = (0..SYNTHETIC_SPECTRUM_BINS)
            .map(|i| ((t + i as f32 * 0.1).sin() * 127.0 + 128.0) / 255.0)
            .collect();

        AudioSnapshot {
            bass: unit(t * 2.0),
            mid: unit(t * 3.0),
            treble: unit(t * 5.0),
            volume: unit(t),
            spectrum,
        }
    }
}
