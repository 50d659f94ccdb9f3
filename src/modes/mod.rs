pub mod playback;
pub mod train;
pub mod visualize;

pub use playback::{Playback, PlaybackConfig, PlaybackSpeed, run_headless};
pub use train::{TrainConfig, TrainMode};
pub use visualize::VisualizeMode;
