//! Audio feature extraction.
//!
//! A background analysis thread turns microphone input, a WAV file or a
//! synthetic signal into normalized band energies and publishes them into a
//! single latest-value [`SnapshotSlot`]. The frame loop reads whatever was
//! published last; there is no queue and no back-pressure.

mod analysis;
mod synthetic;
mod system;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use thiserror::Error;

pub use analysis::{hann_window, FeatureExtractor};
pub use synthetic::{SyntheticSource, SYNTHETIC_SPECTRUM_BINS};
pub use system::{AudioMode, AudioSource, AudioSystem};

/// Normalized audio features for one analysis frame.
///
/// Every field and every spectrum bin lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AudioSnapshot {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub volume: f32,
    pub spectrum: Vec<f32>,
}

/// Latest-value slot shared between the analysis thread and the frame loop.
///
/// Publishing swaps in a complete snapshot under the lock, so a reader sees
/// either the previous snapshot or the new one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSlot {
    inner: Arc<Mutex<Option<Arc<AudioSnapshot>>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot.
    pub fn publish(&self, snapshot: AudioSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Most recently published snapshot, if any.
    pub fn latest(&self) -> Option<Arc<AudioSnapshot>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the current snapshot; readers see `None` until the next publish.
    pub fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Errors raised while setting up audio analysis.
///
/// Capture and file errors never reach the frame loop: the audio system
/// logs them and switches to the synthetic source.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid analyzer config: {0}")]
    InvalidConfig(String),

    #[error("no audio input device available")]
    NoInputDevice,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("unsupported input sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read WAV file {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("WAV file {0} contains no samples")]
    EmptyWav(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn snapshot(level: f32) -> AudioSnapshot {
        AudioSnapshot {
            bass: level,
            mid: level,
            treble: level,
            volume: level,
            spectrum: vec![level; 16],
        }
    }

    #[test]
    fn test_slot_starts_empty() {
        assert!(SnapshotSlot::new().latest().is_none());
    }

    #[test]
    fn test_slot_returns_most_recent_publish() {
        let slot = SnapshotSlot::new();
        slot.publish(snapshot(0.1));
        slot.publish(snapshot(0.9));
        assert_eq!(slot.latest().unwrap().bass, 0.9);

        slot.clear();
        assert!(slot.latest().is_none());
    }

    #[test]
    fn test_slot_readers_never_see_torn_snapshots() {
        let slot = SnapshotSlot::new();
        let writer_slot = slot.clone();

        let writer = thread::spawn(move || {
            for i in 0..500 {
                writer_slot.publish(snapshot(i as f32 / 500.0));
            }
        });

        for _ in 0..500 {
            if let Some(s) = slot.latest() {
                // Every field was written together
                assert_eq!(s.bass, s.volume);
                assert!(s.spectrum.iter().all(|&b| b == s.bass));
            }
        }

        writer.join().unwrap();
    }
}
