pub mod sink;

pub use sink::{FnSink, FrameSink};
