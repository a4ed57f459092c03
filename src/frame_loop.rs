//! Paced frame pump driving a [`Scene`].

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::SnapshotSlot;
use crate::scene::{FrameOutput, Scene};

/// Supported frame rates (frames per second)
pub const FPS_RANGE: RangeInclusive<f32> = 0.01..=1000.0;

/// Longest uninterrupted sleep while waiting for a frame slot
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Frame loop timing
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Target frame rate (frames per second)
    pub fps: f32,

    /// Stop after this much (real or simulated) time; `None` runs until cancelled
    pub duration: Option<Duration>,

    /// Pace against the wall clock. When false, frames run back to back and
    /// elapsed time advances by exactly one frame period per tick.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            duration: None,
            realtime: true,
        }
    }
}

impl LoopConfig {
    fn frame_period(&self) -> Duration {
        let fps = if self.fps.is_finite() && self.fps > 0.0 {
            let clamped = self.fps.clamp(*FPS_RANGE.start(), *FPS_RANGE.end());
            if clamped != self.fps {
                log::warn!("Frame rate {} out of range, using {}", self.fps, clamped);
            }
            clamped
        } else {
            log::warn!("Invalid frame rate {}, using 60", self.fps);
            60.0
        };
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }
}

/// Cancels a running [`FrameLoop`]; cloneable and idempotent.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    cancelled: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Stop the loop before its next tick.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopStats {
    pub frames: u64,
    /// Elapsed scene time of the last frame (seconds)
    pub last_elapsed: f32,
}

pub struct FrameLoop {
    config: LoopConfig,
    handle: LoopHandle,
}

impl FrameLoop {
    pub fn new(config: LoopConfig) -> Self {
        Self {
            config,
            handle: LoopHandle::default(),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Tick `scene` until the duration ends or the loop is cancelled.
    ///
    /// # Arguments
    /// * `scene` - Scene to advance
    /// * `audio` - Latest-value audio slot; `None` animates without audio
    /// * `sink` - Receives every frame
    pub fn run<F>(&self, scene: &mut Scene, audio: Option<&SnapshotSlot>, mut sink: F) -> LoopStats
    where
        F: FnMut(&FrameOutput),
    {
        let period = self.config.frame_period();
        let start = Instant::now();
        let mut frames: u64 = 0;
        let mut last_elapsed = 0.0;

        log::info!(
            "Frame loop: {:.0} fps{}",
            1.0 / period.as_secs_f32(),
            match self.config.duration {
                Some(d) => format!(" for {:.1}s", d.as_secs_f32()),
                None => String::new(),
            }
        );

        loop {
            let elapsed = if self.config.realtime {
                // Sleep until this frame's slot, waking to notice cancellation
                let deadline = start + period.mul_f64(frames as f64);
                loop {
                    let now = Instant::now();
                    if deadline <= now || self.handle.is_cancelled() {
                        break;
                    }
                    thread::sleep((deadline - now).min(CANCEL_POLL_INTERVAL));
                }
                start.elapsed()
            } else {
                period.mul_f64(frames as f64)
            };

            if self.handle.is_cancelled() {
                log::debug!("Frame loop cancelled after {} frames", frames);
                break;
            }
            if matches!(self.config.duration, Some(limit) if elapsed >= limit) {
                break;
            }

            let snapshot = audio.and_then(SnapshotSlot::latest);
            let output = scene.tick(elapsed.as_secs_f32(), snapshot.as_deref());
            log::trace!("Frame {} at {:.3}s", frames, output.elapsed);

            sink(&output);

            frames += 1;
            last_elapsed = output.elapsed;
        }

        LoopStats {
            frames,
            last_elapsed,
        }
    }
}
