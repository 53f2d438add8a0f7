//! Audio buffer implementations.
//!
//! - [`PcmFrameCollector`] - Carries float samples between callbacks and emits fixed-size PCM frames

pub mod frame_collector;

pub use frame_collector::PcmFrameCollector;
