//! Audio data types, conversion and buffering.
//!
//! # Data Types
//! - [`AudioSample`] - Float/PCM sample conversion
//! - [`frame::EncodedFrame`] - Little-endian 16-bit PCM payload with a sequence number
//!
//! # Buffers
//! - [`buffers::PcmFrameCollector`] - Slices float blocks into fixed-size PCM frames
//!
//! # Consumers
//! - [`segmenter::SpeechSegmenter`] - Groups frames into speech segments
//! - [`vad::SpeechDetector`] - WebRTC VAD or RMS-threshold speech detection
//! - [`effects::level_meter`] - RMS level metering

pub mod buffers;
pub mod effects;
pub mod frame;
pub mod sample;
pub mod segmenter;
pub mod vad;

pub use buffers::PcmFrameCollector;
pub use effects::{calculate_rms, frame_rms, level_percent};
pub use frame::EncodedFrame;
pub use sample::{AudioSample, f32_to_pcm16, pcm16_to_f32};
pub use segmenter::{SpeechSegment, SpeechSegmenter};
pub use vad::SpeechDetector;
