//! Float-to-PCM frame collector.

use tracing::{debug, trace, warn};

use crate::audio::frame::{EncodedFrame, first_channel};
use crate::config::{CollectorConfig, ConfigError, FrameLayout};
use crate::pipeline::FrameSink;

/// Slices incoming float blocks into fixed-size 16-bit PCM frames.
///
/// Blocks arrive at whatever size the host delivers. Samples that do not fill
/// a whole frame wait in the carry buffer for the next call. Each complete
/// frame is encoded and handed to the sink right away, in sample order.
///
/// In [`FrameLayout::Unframed`] mode every block is encoded whole and nothing
/// is carried over.
///
/// Samples still in the carry buffer when the collector is dropped are lost.
/// Call [`flush`](Self::flush) first to keep them.
pub struct PcmFrameCollector<S> {
    layout: FrameLayout,
    carry: Vec<f32>,
    sink: S,
    sequence_number: u64,
    dropped_frames: u64,
}

impl<S: FrameSink> PcmFrameCollector<S> {
    pub fn new(config: &CollectorConfig, sink: S) -> Result<Self, ConfigError> {
        let layout = config.layout()?;
        debug!(
            sample_rate = config.sample_rate,
            frame_size = ?layout.frame_size(),
            "Frame collector created"
        );
        Ok(Self::with_layout(layout, sink))
    }

    /// Build a collector with an explicit frame size. 0 selects unframed mode.
    pub fn with_frame_size(frame_size: usize, sink: S) -> Self {
        Self::with_layout(FrameLayout::from_frame_size(frame_size), sink)
    }

    pub fn with_layout(layout: FrameLayout, sink: S) -> Self {
        let capacity = layout.frame_size().unwrap_or(0);
        Self {
            layout,
            carry: Vec::with_capacity(capacity),
            sink,
            sequence_number: 0,
            dropped_frames: 0,
        }
    }

    /// Process one host callback. Only the first channel is used.
    ///
    /// Returns the number of frames produced, including any the sink rejected.
    pub fn process(&mut self, inputs: &[&[f32]]) -> usize {
        match first_channel(inputs) {
            Some(block) => self.process_block(block),
            None => 0,
        }
    }

    /// Append a mono block and emit every frame it completes.
    ///
    /// Returns the number of frames produced, including any the sink
    /// rejected (see [`dropped_frames`](Self::dropped_frames)). An empty block
    /// is a no-op.
    pub fn process_block(&mut self, block: &[f32]) -> usize {
        if block.is_empty() {
            return 0;
        }

        let frame_size = match self.layout {
            FrameLayout::Framed(size) => size.get(),
            FrameLayout::Unframed => {
                let frame = EncodedFrame::encode(self.next_sequence(), block);
                self.emit(frame);
                return 1;
            }
        };

        let mut rest = block;
        let mut produced = 0;

        if !self.carry.is_empty() {
            let needed = frame_size - self.carry.len();
            if rest.len() < needed {
                self.carry.extend_from_slice(rest);
                return 0;
            }

            let (head, tail) = rest.split_at(needed);
            self.carry.extend_from_slice(head);
            let frame = EncodedFrame::encode(self.next_sequence(), &self.carry);
            self.carry.clear();
            self.emit(frame);
            produced += 1;
            rest = tail;
        }

        let mut windows = rest.chunks_exact(frame_size);
        for window in &mut windows {
            let frame = EncodedFrame::encode(self.next_sequence(), window);
            self.emit(frame);
            produced += 1;
        }
        self.carry.extend_from_slice(windows.remainder());

        produced
    }

    /// Emit any carried samples as a final frame, zero-padded to full length.
    ///
    /// Returns the number of real samples flushed, or `None` if there was
    /// nothing to flush.
    pub fn flush(&mut self) -> Option<usize> {
        let frame_size = self.layout.frame_size()?;
        if self.carry.is_empty() {
            return None;
        }

        let flushed = self.carry.len();
        let frame = EncodedFrame::encode_padded(
            self.next_sequence(),
            &self.carry,
            frame_size - flushed,
        );
        self.carry.clear();
        self.emit(frame);
        debug!(flushed, padding = frame_size - flushed, "Flushed carry buffer");
        Some(flushed)
    }

    fn emit(&mut self, frame: EncodedFrame) {
        let sequence_number = frame.sequence_number;
        match self.sink.push(frame) {
            Ok(()) => trace!(sequence_number, "Frame emitted"),
            Err(_) => {
                self.dropped_frames += 1;
                warn!(sequence_number, "Frame sink full, dropping frame");
            }
        }
    }
}

impl<S> PcmFrameCollector<S> {
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_number;
        self.sequence_number += 1;
        seq
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Samples per frame, or `None` when unframed.
    pub fn frame_size(&self) -> Option<usize> {
        self.layout.frame_size()
    }

    /// Samples waiting for the next block.
    pub fn carry(&self) -> &[f32] {
        &self.carry
    }

    /// Frames produced so far, including any the sink rejected.
    pub fn frames_produced(&self) -> u64 {
        self.sequence_number
    }

    /// Frames the sink refused.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<S> Drop for PcmFrameCollector<S> {
    fn drop(&mut self) {
        if !self.carry.is_empty() {
            debug!(discarded = self.carry.len(), "Discarding unflushed samples");
        }
    }
}
