//! Audio level metering over 16-bit PCM.

use crate::audio::frame::EncodedFrame;
use crate::audio::sample::AudioSample;

/// Root mean square of PCM samples, in sample units (0 to 32768).
pub fn calculate_rms<I>(samples: I) -> f64
where
    I: IntoIterator<Item = i16>,
{
    let (sum_sq, count) = samples
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), s| {
            let v = s as f64;
            (sum + v * v, count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}

pub fn frame_rms(frame: &EncodedFrame) -> f64 {
    calculate_rms(frame.samples())
}

/// Level as a percentage of full scale. Range: 0-100.
pub fn level_percent(frame: &EncodedFrame) -> u32 {
    let (sum_sq, count) = frame.samples().fold((0.0f64, 0usize), |(sum, count), s| {
        let v = s.to_f64_normalized();
        (sum + v * v, count + 1)
    });
    if count == 0 {
        return 0;
    }
    let rms = (sum_sq / count as f64).sqrt();
    (rms * 100.0).min(100.0) as u32
}
