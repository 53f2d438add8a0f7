//! Output side of the collector.
//!
//! A [`FrameSink`] receives each encoded frame as soon as it is complete. The
//! push must never block: a sink that cannot take a frame right now hands it
//! back and the collector drops it.

use crossbeam::channel::{Sender, TrySendError};
use rtrb::{Producer, PushError};

use crate::audio::frame::EncodedFrame;

pub trait FrameSink {
    /// Hand off one frame without waiting.
    ///
    /// Returns the frame back if it could not be accepted.
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame>;
}

/// Lock-free SPSC handoff from the audio thread.
impl FrameSink for Producer<EncodedFrame> {
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame> {
        Producer::push(self, frame).map_err(|err| match err {
            PushError::Full(frame) => frame,
        })
    }
}

impl FrameSink for Sender<EncodedFrame> {
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame> {
        self.try_send(frame).map_err(|err| match err {
            TrySendError::Full(frame) | TrySendError::Disconnected(frame) => frame,
        })
    }
}

/// Keeps every frame. Mostly useful in tests and offline conversion.
impl FrameSink for Vec<EncodedFrame> {
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame> {
        Vec::push(self, frame);
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame> {
        (**self).push(frame)
    }
}

/// A sink that calls a closure with each frame.
pub struct FnSink<F> {
    callback: F,
}

impl<F> FnSink<F>
where
    F: FnMut(EncodedFrame),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> FrameSink for FnSink<F>
where
    F: FnMut(EncodedFrame),
{
    fn push(&mut self, frame: EncodedFrame) -> Result<(), EncodedFrame> {
        (self.callback)(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_full_returns_frame() {
        let (mut producer, mut consumer) = rtrb::RingBuffer::<EncodedFrame>::new(1);

        assert!(FrameSink::push(&mut producer, EncodedFrame::encode(0, &[0.0])).is_ok());
        let rejected = FrameSink::push(&mut producer, EncodedFrame::encode(1, &[0.0]));
        assert_eq!(rejected.unwrap_err().sequence_number, 1);

        assert_eq!(consumer.pop().unwrap().sequence_number, 0);
    }

    #[test]
    fn test_channel_disconnected_returns_frame() {
        let (mut sender, receiver) = crossbeam::channel::bounded::<EncodedFrame>(4);

        assert!(FrameSink::push(&mut sender, EncodedFrame::encode(0, &[0.0])).is_ok());
        assert_eq!(receiver.recv().unwrap().sequence_number, 0);

        drop(receiver);
        assert!(FrameSink::push(&mut sender, EncodedFrame::encode(1, &[0.0])).is_err());
    }

    #[test]
    fn test_fn_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = FnSink::new(|frame: EncodedFrame| seen.push(frame.sequence_number));
            sink.push(EncodedFrame::encode(3, &[])).unwrap();
            sink.push(EncodedFrame::encode(4, &[])).unwrap();
        }
        assert_eq!(seen, vec![3, 4]);
    }
}
