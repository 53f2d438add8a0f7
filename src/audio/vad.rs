//! Per-frame speech detection.

use tracing::warn;
use webrtc_vad::{SampleRate, Vad, VadMode};

use crate::audio::effects::frame_rms;
use crate::audio::frame::EncodedFrame;
use crate::config::{ConfigError, SegmenterConfig};

/// Decides whether one PCM frame contains speech.
pub enum SpeechDetector {
    /// WebRTC voice activity detection.
    Vad(Vad),
    /// Frame RMS, in sample units, above a fixed threshold.
    Rms { threshold: f64 },
}

impl SpeechDetector {
    pub fn from_config(config: &SegmenterConfig) -> Result<Self, ConfigError> {
        if !config.use_vad {
            return Ok(Self::Rms {
                threshold: config.rms_threshold,
            });
        }

        let mode = vad_mode(config.vad_aggressiveness)?;
        let rate = vad_sample_rate(config.sample_rate)?;
        if !is_vad_frame(config.sample_rate, config.frame_size) {
            return Err(ConfigError::UnsupportedVadFrame {
                sample_rate: config.sample_rate,
                frame_size: config.frame_size,
            });
        }
        Ok(Self::Vad(Vad::new_with_rate_and_mode(rate, mode)))
    }

    pub fn is_speech(&mut self, frame: &EncodedFrame) -> bool {
        match self {
            Self::Rms { threshold } => frame_rms(frame) > *threshold,
            Self::Vad(vad) => {
                let samples: Vec<i16> = frame.samples().collect();
                match vad.is_voice_segment(&samples) {
                    Ok(voiced) => voiced,
                    Err(()) => {
                        warn!(len = samples.len(), "VAD rejected frame");
                        false
                    }
                }
            }
        }
    }
}

fn vad_mode(aggressiveness: u8) -> Result<VadMode, ConfigError> {
    match aggressiveness {
        0 => Ok(VadMode::Quality),
        1 => Ok(VadMode::LowBitrate),
        2 => Ok(VadMode::Aggressive),
        3 => Ok(VadMode::VeryAggressive),
        other => Err(ConfigError::InvalidVadAggressiveness(other)),
    }
}

fn vad_sample_rate(sample_rate: u32) -> Result<SampleRate, ConfigError> {
    match sample_rate {
        8000 => Ok(SampleRate::Rate8kHz),
        16000 => Ok(SampleRate::Rate16kHz),
        32000 => Ok(SampleRate::Rate32kHz),
        48000 => Ok(SampleRate::Rate48kHz),
        other => Err(ConfigError::UnsupportedVadSampleRate(other)),
    }
}

fn is_vad_frame(sample_rate: u32, frame_size: usize) -> bool {
    [10, 20, 30]
        .iter()
        .any(|ms| frame_size == sample_rate as usize * ms / 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms_config() -> SegmenterConfig {
        SegmenterConfig::rms_only(16000, 160, 500.0)
    }

    #[test]
    fn test_rms_detector() {
        let mut detector = SpeechDetector::from_config(&rms_config()).unwrap();
        assert!(matches!(detector, SpeechDetector::Rms { .. }));

        assert!(detector.is_speech(&EncodedFrame::encode(0, &[0.5; 160])));
        assert!(!detector.is_speech(&EncodedFrame::encode(1, &[0.001; 160])));
    }

    #[test]
    fn test_vad_detector_rejects_silence() {
        let config = SegmenterConfig::new(16000, 320);
        let mut detector = SpeechDetector::from_config(&config).unwrap();
        assert!(matches!(detector, SpeechDetector::Vad(_)));

        for seq in 0..10 {
            assert!(!detector.is_speech(&EncodedFrame::encode(seq, &[0.0; 320])));
        }
    }

    #[test]
    fn test_vad_wrong_length_is_not_speech() {
        let mut detector = SpeechDetector::from_config(&SegmenterConfig::new(16000, 160)).unwrap();
        assert!(!detector.is_speech(&EncodedFrame::encode(0, &[0.5; 100])));
    }

    #[test]
    fn test_vad_config_validation() {
        assert!(matches!(
            SpeechDetector::from_config(&SegmenterConfig::new(44100, 441)),
            Err(ConfigError::UnsupportedVadSampleRate(44100))
        ));
        assert!(matches!(
            SpeechDetector::from_config(&SegmenterConfig::new(16000, 256)),
            Err(ConfigError::UnsupportedVadFrame { frame_size: 256, .. })
        ));

        let config = SegmenterConfig {
            vad_aggressiveness: 4,
            ..SegmenterConfig::new(16000, 160)
        };
        assert!(matches!(
            SpeechDetector::from_config(&config),
            Err(ConfigError::InvalidVadAggressiveness(4))
        ));

        // The RMS fallback accepts any rate and frame size.
        let config = SegmenterConfig::rms_only(44100, 441, 500.0);
        assert!(SpeechDetector::from_config(&config).is_ok());
    }
}
