use crate::audio::sample::{AudioSample, f32_to_pcm16};

/// Bytes per encoded sample (16-bit PCM).
pub const BYTES_PER_SAMPLE: usize = 2;

/// A block of little-endian signed 16-bit PCM, ready for handoff.
///
/// The payload carries no header or length prefix. The consumer is expected
/// to know the sample rate and frame size out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Monotonic sequence number assigned by the collector. Not part of the payload.
    pub sequence_number: u64,

    data: Vec<u8>,
}

impl EncodedFrame {
    /// Encode float samples, in order, into a new frame.
    pub fn encode(sequence_number: u64, samples: &[f32]) -> Self {
        let mut data = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
        for &sample in samples {
            data.extend_from_slice(&f32_to_pcm16(sample).to_le_bytes());
        }
        Self {
            sequence_number,
            data,
        }
    }

    /// Encode `samples` followed by `padding` zero samples.
    pub(crate) fn encode_padded(sequence_number: u64, samples: &[f32], padding: usize) -> Self {
        let mut frame = Self::encode(sequence_number, samples);
        let silence = i16::silence().to_le_bytes();
        for _ in 0..padding {
            frame.data.extend_from_slice(&silence);
        }
        frame
    }

    /// Wrap an already encoded payload.
    ///
    /// Returns `None` if the byte count is odd.
    pub fn from_bytes(sequence_number: u64, data: Vec<u8>) -> Option<Self> {
        if data.len() % BYTES_PER_SAMPLE != 0 {
            return None;
        }
        Some(Self {
            sequence_number,
            data,
        })
    }

    /// Returns the number of PCM samples in the frame.
    pub fn len_samples(&self) -> usize {
        self.data.len() / BYTES_PER_SAMPLE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Access the raw little-endian payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the frame and returns the raw payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate the decoded PCM samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }
}

/// Select the first channel of a multi-channel input.
///
/// Returns `None` if there are no channels or the first one is empty.
pub fn first_channel<'a>(inputs: &[&'a [f32]]) -> Option<&'a [f32]> {
    inputs.first().copied().filter(|channel| !channel.is_empty())
}
