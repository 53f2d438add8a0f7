//! Collector and segmenter configuration.

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FRAME_DURATION_SECS: f64 = 0.02;
pub const DEFAULT_RMS_THRESHOLD: f64 = 500.0;
pub const DEFAULT_SILENCE_DURATION_SECS: f64 = 0.5;
pub const DEFAULT_VAD_AGGRESSIVENESS: u8 = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("frame duration must be a positive finite number of seconds, got {0}")]
    InvalidDuration(f64),
    #[error("{sample_rate} Hz * {duration_secs} s rounds to zero samples per frame")]
    EmptyFrame { sample_rate: u32, duration_secs: f64 },
    #[error("frame_size and frame_duration_secs are mutually exclusive")]
    ConflictingFrameSize,
    #[error("VAD aggressiveness must be 0-3, got {0}")]
    InvalidVadAggressiveness(u8),
    #[error("VAD does not support a sample rate of {0} Hz")]
    UnsupportedVadSampleRate(u32),
    #[error("VAD needs 10, 20 or 30 ms frames, got {frame_size} samples at {sample_rate} Hz")]
    UnsupportedVadFrame { sample_rate: u32, frame_size: usize },
}

/// How delivered blocks are grouped before emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    /// Emit fixed frames of this many samples, carrying leftovers between calls.
    Framed(NonZeroUsize),
    /// Encode and emit each delivered block as it arrives.
    Unframed,
}

impl FrameLayout {
    /// An explicit frame size of 0 selects the unframed variant.
    pub fn from_frame_size(frame_size: usize) -> Self {
        match NonZeroUsize::new(frame_size) {
            Some(size) => Self::Framed(size),
            None => Self::Unframed,
        }
    }

    pub fn frame_size(&self) -> Option<usize> {
        match self {
            Self::Framed(size) => Some(size.get()),
            Self::Unframed => None,
        }
    }
}

/// Frame collector settings.
///
/// `frame_size` overrides the duration-derived size. Leaving both unset uses
/// [`DEFAULT_FRAME_DURATION_SECS`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectorConfig {
    pub sample_rate: u32,
    #[serde(default)]
    pub frame_duration_secs: Option<f64>,
    #[serde(default)]
    pub frame_size: Option<usize>,
}

impl CollectorConfig {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frame_duration_secs: None,
            frame_size: None,
        }
    }

    pub fn with_frame_duration(mut self, secs: f64) -> Self {
        self.frame_duration_secs = Some(secs);
        self
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = Some(frame_size);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse collector config")
    }

    /// Resolve the frame layout, rejecting settings that cannot produce frames.
    pub fn layout(&self) -> Result<FrameLayout, ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }

        match (self.frame_size, self.frame_duration_secs) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingFrameSize),
            (Some(size), None) => Ok(FrameLayout::from_frame_size(size)),
            (None, duration) => {
                let duration_secs = duration.unwrap_or(DEFAULT_FRAME_DURATION_SECS);
                samples_for_duration(self.sample_rate, duration_secs).map(FrameLayout::Framed)
            }
        }
    }

    /// Duration of one frame in seconds, if framed.
    pub fn frame_duration(&self) -> Result<Option<f64>, ConfigError> {
        Ok(self
            .layout()?
            .frame_size()
            .map(|size| size as f64 / self.sample_rate as f64))
    }
}

/// `round(sample_rate * duration_secs)`, rejecting zero.
pub fn samples_for_duration(
    sample_rate: u32,
    duration_secs: f64,
) -> Result<NonZeroUsize, ConfigError> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(ConfigError::InvalidDuration(duration_secs));
    }

    let samples = (sample_rate as f64 * duration_secs).round() as usize;
    NonZeroUsize::new(samples).ok_or(ConfigError::EmptyFrame {
        sample_rate,
        duration_secs,
    })
}

/// Speech segmenter settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmenterConfig {
    pub sample_rate: u32,
    pub frame_size: usize,
    /// RMS in 16-bit sample units above which a frame counts as speech.
    #[serde(default = "default_rms_threshold")]
    pub rms_threshold: f64,
    /// Trailing silence that closes a segment once speech has started.
    #[serde(default = "default_silence_duration")]
    pub silence_duration_secs: f64,
    /// Use WebRTC voice activity detection instead of the RMS threshold.
    #[serde(default = "default_use_vad")]
    pub use_vad: bool,
    /// 0 (least) to 3 (most aggressive at filtering non-speech).
    #[serde(default = "default_vad_aggressiveness")]
    pub vad_aggressiveness: u8,
}

fn default_rms_threshold() -> f64 {
    DEFAULT_RMS_THRESHOLD
}

fn default_silence_duration() -> f64 {
    DEFAULT_SILENCE_DURATION_SECS
}

fn default_use_vad() -> bool {
    true
}

fn default_vad_aggressiveness() -> u8 {
    DEFAULT_VAD_AGGRESSIVENESS
}

impl SegmenterConfig {
    pub fn new(sample_rate: u32, frame_size: usize) -> Self {
        Self {
            sample_rate,
            frame_size,
            rms_threshold: DEFAULT_RMS_THRESHOLD,
            silence_duration_secs: DEFAULT_SILENCE_DURATION_SECS,
            use_vad: true,
            vad_aggressiveness: DEFAULT_VAD_AGGRESSIVENESS,
        }
    }

    /// RMS-threshold detection only, no VAD.
    pub fn rms_only(sample_rate: u32, frame_size: usize, rms_threshold: f64) -> Self {
        Self {
            rms_threshold,
            use_vad: false,
            ..Self::new(sample_rate, frame_size)
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse segmenter config")
    }

    /// Number of consecutive quiet frames that ends a segment (at least 1).
    pub fn silence_frames(&self) -> usize {
        if self.sample_rate == 0 || self.frame_size == 0 {
            return 1;
        }
        let silence_samples = self.silence_duration_secs * self.sample_rate as f64;
        ((silence_samples / self.frame_size as f64) as usize).max(1)
    }
}
