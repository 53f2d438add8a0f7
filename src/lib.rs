//! Float-to-PCM frame collection for live audio.
//!
//! A host audio callback hands [`PcmFrameCollector`] blocks of `f32` samples.
//! The collector converts them to little-endian 16-bit PCM, groups them into
//! fixed-duration frames and pushes each frame to a [`FrameSink`] without
//! blocking.

pub mod audio;
pub mod config;
pub mod pipeline;

pub use audio::{
    EncodedFrame, PcmFrameCollector, SpeechDetector, SpeechSegment, SpeechSegmenter, f32_to_pcm16,
    pcm16_to_f32,
};
pub use config::{CollectorConfig, ConfigError, FrameLayout, SegmenterConfig};
pub use pipeline::{FnSink, FrameSink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_feeds_segmenter_over_channel() {
        let config = CollectorConfig::new(16000).with_frame_duration(0.01);
        let (sender, receiver) = crossbeam::channel::bounded::<EncodedFrame>(256);
        let mut collector = PcmFrameCollector::new(&config, sender).unwrap();
        let frame_size = collector.frame_size().unwrap();
        assert_eq!(frame_size, 160);

        let worker = std::thread::spawn(move || {
            let mut segmenter = SpeechSegmenter::new(SegmenterConfig {
                silence_duration_secs: 0.05,
                ..SegmenterConfig::rms_only(16000, frame_size, 500.0)
            })
            .unwrap();
            let mut segments = Vec::new();
            for frame in receiver {
                segments.extend(segmenter.push_frame(&frame));
            }
            segments.extend(segmenter.flush());
            segments
        });

        // 100 ms tone, 100 ms silence, delivered in 128-sample blocks.
        let mut signal: Vec<f32> = (0..1600)
            .map(|i| (i as f32 * 0.05).sin() * 0.5)
            .collect();
        signal.extend(std::iter::repeat_n(0.0, 1600));
        for block in signal.chunks(128) {
            collector.process(&[block]);
        }
        assert_eq!(collector.dropped_frames(), 0);
        assert_eq!(collector.frames_produced(), 20);
        drop(collector);

        let segments = worker.join().unwrap();
        // Tone plus five quiet frames close the first segment; the rest is flushed.
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len_samples(), 15 * 160);
        assert_eq!(segments[1].len_samples(), 5 * 160);

        let wav = segments[0].to_wav().unwrap();
        let reader = hound::WavReader::new(std::io::Cursor::new(wav)).unwrap();
        assert_eq!(reader.len() as usize, 15 * 160);
    }
}
