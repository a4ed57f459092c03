//! Audio system owning capture, file playback and the analysis thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use super::{AudioError, FeatureExtractor, SnapshotSlot, SyntheticSource};
use crate::params::AnalyzerConfig;

/// Captured samples kept for analysis, in FFT windows
const CAPTURE_WINDOWS_RETAINED: usize = 4;

/// Requested audio input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMode {
    /// Default input device
    Microphone,
    /// Loop a WAV file in real time
    Wav(PathBuf),
    /// Sine-driven stand-in
    Synthetic,
    /// No audio; the slot stays empty
    Off,
}

/// Input actually feeding the slot after any fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    Microphone,
    Wav,
    Synthetic,
    Off,
}

/// Audio system managing capture and FFT analysis
pub struct AudioSystem {
    /// Latest published features (thread-safe)
    slot: SnapshotSlot,

    source: AudioSource,

    /// Cleared to ask the analysis thread to exit
    running: Arc<AtomicBool>,

    /// Analysis thread handle, joined on stop
    worker: Option<thread::JoinHandle<()>>,

    /// Input stream (kept alive while capturing)
    stream: Option<cpal::Stream>,
}

impl AudioSystem {
    /// Start analysis for `mode`.
    ///
    /// Only an invalid `config` is an error. A missing device or unreadable
    /// file is logged and replaced by the synthetic source for the lifetime
    /// of this system.
    pub fn start(config: AnalyzerConfig, mode: AudioMode) -> Result<Self, AudioError> {
        config.validate()?;

        let mut system = Self {
            slot: SnapshotSlot::new(),
            source: AudioSource::Off,
            running: Arc::new(AtomicBool::new(true)),
            worker: None,
            stream: None,
        };

        match mode {
            AudioMode::Off => log::info!("Audio: off"),
            AudioMode::Synthetic => system.start_synthetic(&config),
            AudioMode::Microphone => {
                if let Err(e) = system.start_microphone(&config) {
                    log::warn!("Microphone unavailable ({}), using synthetic audio", e);
                    system.start_synthetic(&config);
                }
            }
            AudioMode::Wav(path) => {
                if let Err(e) = system.start_wav(&config, &path) {
                    log::warn!("{}, using synthetic audio", e);
                    system.start_synthetic(&config);
                }
            }
        }

        Ok(system)
    }

    /// Handle to the shared latest-value slot
    pub fn slot(&self) -> SnapshotSlot {
        self.slot.clone()
    }

    pub fn source(&self) -> AudioSource {
        self.source
    }

    /// Stop analysis and release the capture stream. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Audio analysis thread panicked");
            }
        }

        if self.stream.take().is_some() {
            log::info!("Audio capture stream released");
        }
    }

    fn start_synthetic(&mut self, config: &AnalyzerConfig) {
        log::info!("Audio: synthetic");

        let source = SyntheticSource::new();
        let started = Instant::now();
        let slot = self.slot.clone();

        self.source = AudioSource::Synthetic;
        self.worker = Some(spawn_analysis_thread(
            Arc::clone(&self.running),
            interval(config),
            move || slot.publish(source.snapshot_at(started.elapsed().as_secs_f32())),
        ));
    }

    fn start_microphone(&mut self, config: &AnalyzerConfig) -> Result<(), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::Device(e.to_string()))?;

        log::info!(
            "Audio: {} @ {}Hz",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            supported.sample_rate().0
        );

        // Analyze at the device rate so band edges stay in Hz
        let mut analyzer_config = config.clone();
        analyzer_config.sample_rate_hz = supported.sample_rate().0 as usize;
        let mut extractor = FeatureExtractor::new(analyzer_config)?;

        let capture = Arc::new(Mutex::new(Vec::<f32>::new()));
        let channels = supported.channels().max(1) as usize;
        let retained = config.fft_size * CAPTURE_WINDOWS_RETAINED;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                let capture = Arc::clone(&capture);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        push_first_channel(&capture, data, channels, retained, |s| s)
                    },
                    |err| log::error!("Audio stream error: {}", err),
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let capture = Arc::clone(&capture);
                device.build_input_stream(
                    &stream_config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        push_first_channel(&capture, data, channels, retained, |s| {
                            s as f32 / i16::MAX as f32
                        })
                    },
                    |err| log::error!("Audio stream error: {}", err),
                    None,
                )
            }
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }
        .map_err(|e| AudioError::Device(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::Device(e.to_string()))?;

        let slot = self.slot.clone();
        let fft_size = config.fft_size;

        self.source = AudioSource::Microphone;
        self.stream = Some(stream);
        self.worker = Some(spawn_analysis_thread(
            Arc::clone(&self.running),
            interval(config),
            move || {
                let window = {
                    let buf = capture.lock().unwrap_or_else(PoisonError::into_inner);
                    if buf.len() < fft_size {
                        return;
                    }
                    buf[buf.len() - fft_size..].to_vec()
                };
                slot.publish(extractor.analyze(&window));
            },
        ));

        Ok(())
    }

    fn start_wav(&mut self, config: &AnalyzerConfig, path: &Path) -> Result<(), AudioError> {
        let (samples, sample_rate) = load_wav(path)?;

        log::info!(
            "Audio: {} ({:.1}s @ {}Hz)",
            path.display(),
            samples.len() as f32 / sample_rate as f32,
            sample_rate
        );

        let mut analyzer_config = config.clone();
        analyzer_config.sample_rate_hz = sample_rate as usize;
        let mut extractor = FeatureExtractor::new(analyzer_config)?;

        let slot = self.slot.clone();
        let fft_size = config.fft_size;
        let started = Instant::now();
        let mut window = vec![0.0; fft_size];

        self.source = AudioSource::Wav;
        self.worker = Some(spawn_analysis_thread(
            Arc::clone(&self.running),
            interval(config),
            move || {
                // Playhead loops over the file in real time
                let elapsed = started.elapsed().as_secs_f64();
                let playhead = (elapsed * sample_rate as f64) as usize % samples.len();
                let len = samples.len() as isize;
                for (k, sample) in window.iter_mut().enumerate() {
                    let index = (playhead as isize - fft_size as isize + k as isize).rem_euclid(len);
                    *sample = samples[index as usize];
                }
                slot.publish(extractor.analyze(&window));
            },
        ));

        Ok(())
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop();
    }
}

fn interval(config: &AnalyzerConfig) -> Duration {
    Duration::from_millis(config.update_interval_ms.max(1))
}

/// Run `step` every `interval` until `running` is cleared.
fn spawn_analysis_thread<F>(
    running: Arc<AtomicBool>,
    interval: Duration,
    mut step: F,
) -> thread::JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            step();
            thread::sleep(interval);
        }
    })
}

/// Append the first channel of an interleaved block, keeping the newest `retained` samples.
fn push_first_channel<T: Copy>(
    capture: &Mutex<Vec<f32>>,
    data: &[T],
    channels: usize,
    retained: usize,
    convert: impl Fn(T) -> f32,
) {
    let mut buf = capture.lock().unwrap_or_else(PoisonError::into_inner);
    buf.extend(data.iter().step_by(channels).map(|&s| convert(s)));
    if buf.len() > retained {
        let excess = buf.len() - retained;
        buf.drain(..excess);
    }
}

/// Read a WAV file and downmix it to mono `f32`.
fn load_wav(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let wav_error = |source| AudioError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let reader = hound::WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_error)?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(wav_error)?
        }
    };

    let mono: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if mono.is_empty() || spec.sample_rate == 0 {
        return Err(AudioError::EmptyWav(path.to_path_buf()));
    }

    Ok((mono, spec.sample_rate))
}
