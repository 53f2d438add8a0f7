//! Float <-> 16-bit PCM sample conversion.
//!
//! Negative amplitudes scale by 32768 and non-negative ones by 32767, so the
//! closed range [-1.0, 1.0] lands exactly on [`i16::MIN`, `i16::MAX`] without
//! wrapping. Scaling happens in `f64`, where the product of an `f32` sample
//! and the scale is exact, so truncation sees the true product.

use std::fmt::Debug;

const NEGATIVE_SCALE: f64 = 32768.0;
const POSITIVE_SCALE: f64 = 32767.0;

pub trait AudioSample: Copy + Send + Sync + PartialOrd + Debug + 'static {
    fn silence() -> Self;

    fn to_f64_normalized(self) -> f64;

    fn from_f64_normalized(value: f64) -> Self;
}

impl AudioSample for f32 {
    fn silence() -> Self {
        0.0
    }

    fn to_f64_normalized(self) -> f64 {
        self as f64
    }

    fn from_f64_normalized(value: f64) -> Self {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(-1.0, 1.0) as f32
    }
}

impl AudioSample for i16 {
    fn silence() -> Self {
        0
    }

    fn to_f64_normalized(self) -> f64 {
        if self < 0 {
            self as f64 / NEGATIVE_SCALE
        } else {
            self as f64 / POSITIVE_SCALE
        }
    }

    fn from_f64_normalized(value: f64) -> Self {
        if value.is_nan() {
            return 0;
        }
        let v = value.clamp(-1.0, 1.0);
        if v < 0.0 {
            (v * NEGATIVE_SCALE) as i16
        } else {
            (v * POSITIVE_SCALE) as i16
        }
    }
}

/// Encode one float sample as signed 16-bit PCM.
///
/// Out-of-range input is clamped, infinities saturate and NaN becomes 0.
/// The scaled value is truncated toward zero.
pub fn f32_to_pcm16(sample: f32) -> i16 {
    i16::from_f64_normalized(sample.to_f64_normalized())
}

/// Decode one PCM sample back to a float that re-encodes to the same value.
pub fn pcm16_to_f32(sample: i16) -> f32 {
    let mut value = f32::from_f64_normalized(sample.to_f64_normalized());
    // Narrowing to f32 can round the quotient a hair low, which truncation
    // would turn into `sample - 1`. Step up to the next representable float.
    // Negative quotients are exact, so this only runs for positive samples.
    while f32_to_pcm16(value) < sample {
        value = f32::from_bits(value.to_bits() + 1);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(sample: f32) -> i16 {
        let s = (sample as f64).clamp(-1.0, 1.0);
        if s < 0.0 {
            (s * 32768.0) as i16
        } else {
            (s * 32767.0) as i16
        }
    }

    fn neighbours(value: f32) -> [f32; 3] {
        let bits = value.to_bits();
        [f32::from_bits(bits - 1), value, f32::from_bits(bits + 1)]
    }

    #[test]
    fn test_boundary_values() {
        assert_eq!(f32_to_pcm16(1.0), 32767);
        assert_eq!(f32_to_pcm16(-1.0), -32768);
        assert_eq!(f32_to_pcm16(0.0), 0);
        assert_eq!(f32_to_pcm16(-0.0), 0);
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(f32_to_pcm16(2.0), f32_to_pcm16(1.0));
        assert_eq!(f32_to_pcm16(-3.5), f32_to_pcm16(-1.0));
    }

    #[test]
    fn test_non_finite_values() {
        assert_eq!(f32_to_pcm16(f32::NAN), 0);
        assert_eq!(f32_to_pcm16(f32::INFINITY), 32767);
        assert_eq!(f32_to_pcm16(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn test_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5, -0.5 * 32768 = -16384
        assert_eq!(f32_to_pcm16(0.5), 16383);
        assert_eq!(f32_to_pcm16(-0.5), -16384);
        assert_eq!(f32_to_pcm16(0.25), 8191);
    }

    #[test]
    fn test_product_just_below_integer_truncates_down() {
        // The nearest f32 to 1/32767 sits slightly below it, so the exact
        // product is 0.99999999907 and must truncate to 0.
        let sample = (1.0f64 / 32767.0) as f32;
        assert_eq!(f32_to_pcm16(sample), 0);
        assert_eq!(f32_to_pcm16(sample), reference(sample));
    }

    #[test]
    fn test_matches_double_reference_near_every_step() {
        for value in 1..=i16::MAX {
            let quotient = (value as f64 / 32767.0) as f32;
            for sample in neighbours(quotient) {
                assert_eq!(f32_to_pcm16(sample), reference(sample), "sample {sample:e}");
                assert_eq!(f32_to_pcm16(-sample), reference(-sample), "sample {:e}", -sample);
            }
        }
    }

    #[test]
    fn test_decode_then_encode_is_identity() {
        for value in i16::MIN..=i16::MAX {
            assert_eq!(f32_to_pcm16(pcm16_to_f32(value)), value, "value {value}");
        }
    }

    #[test]
    fn test_audio_sample_trait() {
        assert_eq!(i16::silence(), 0);
        assert_eq!(f32::silence(), 0.0);
        assert_eq!(i16::from_f64_normalized(1.0), i16::MAX);
        assert_eq!(i16::MIN.to_f64_normalized(), -1.0);
        assert_eq!(i16::MAX.to_f64_normalized(), 1.0);
        assert_eq!(f32::from_f64_normalized(f64::NAN), 0.0);
    }
}
