pub mod level_meter;

pub use level_meter::{calculate_rms, frame_rms, level_percent};
