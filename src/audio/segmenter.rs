//! Groups encoded frames into speech segments.
//!
//! Runs on the consumer side of the collector's sink, off the audio thread.
//! Each frame is classified by a [`SpeechDetector`]: WebRTC VAD by default,
//! or an RMS threshold when VAD is turned off. Once speech has started, a run
//! of non-speech frames closes the segment.

use std::io::Cursor;

use anyhow::{Context, Result};
use tracing::debug;

use crate::audio::frame::{BYTES_PER_SAMPLE, EncodedFrame};
use crate::audio::vad::SpeechDetector;
use crate::config::{ConfigError, SegmenterConfig};

/// A finished run of PCM frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSegment {
    pub sample_rate: u32,
    pub pcm: Vec<u8>,
}

impl SpeechSegment {
    pub fn len_samples(&self) -> usize {
        self.pcm.len() / BYTES_PER_SAMPLE
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len_samples() as f64 / self.sample_rate as f64
    }

    /// Render as a mono 16-bit WAV file in memory.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer =
                hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
            for pair in self.pcm.chunks_exact(BYTES_PER_SAMPLE) {
                writer
                    .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                    .context("Failed to write WAV sample")?;
            }
            writer.finalize().context("Failed to finalize WAV")?;
        }
        Ok(cursor.into_inner())
    }
}

pub struct SpeechSegmenter {
    config: SegmenterConfig,
    detector: SpeechDetector,
    frame_bytes: usize,
    silence_frames: usize,
    pending: Vec<u8>,
    in_speech: bool,
    silence_count: usize,
}

impl SpeechSegmenter {
    pub fn new(config: SegmenterConfig) -> Result<Self, ConfigError> {
        let detector = SpeechDetector::from_config(&config)?;
        let frame_bytes = config.frame_size * BYTES_PER_SAMPLE;
        let silence_frames = config.silence_frames();
        debug!(
            use_vad = config.use_vad,
            silence_frames, "Speech segmenter created"
        );
        Ok(Self {
            config,
            detector,
            frame_bytes,
            silence_frames,
            pending: Vec::new(),
            in_speech: false,
            silence_count: 0,
        })
    }

    /// Feed one frame. Returns a segment when trailing silence closes one.
    ///
    /// Frames of the wrong length are ignored.
    pub fn push_frame(&mut self, frame: &EncodedFrame) -> Option<SpeechSegment> {
        if frame.as_bytes().len() != self.frame_bytes {
            debug!(
                len = frame.as_bytes().len(),
                expected = self.frame_bytes,
                "Ignoring frame with unexpected length"
            );
            return None;
        }

        self.pending.extend_from_slice(frame.as_bytes());

        if self.detector.is_speech(frame) {
            self.in_speech = true;
            self.silence_count = 0;
        } else if self.in_speech {
            self.silence_count += 1;
            if self.silence_count >= self.silence_frames {
                return Some(self.finalize());
            }
        }
        None
    }

    /// Close whatever is pending, speech or not.
    pub fn flush(&mut self) -> Option<SpeechSegment> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.finalize())
    }

    pub fn in_speech(&self) -> bool {
        self.in_speech
    }

    /// Bytes buffered for the current segment.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn finalize(&mut self) -> SpeechSegment {
        self.in_speech = false;
        self.silence_count = 0;
        let segment = SpeechSegment {
            sample_rate: self.config.sample_rate,
            pcm: std::mem::take(&mut self.pending),
        };
        debug!(
            samples = segment.len_samples(),
            duration_secs = segment.duration_secs(),
            "Speech segment finalized"
        );
        segment
    }
}
