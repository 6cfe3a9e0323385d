//! Headtrack Audio Cues
//!
//! Locates the loud audio cues that align trial segments to the video:
//! - **WAV:** Minimal PCM / IEEE-float WAV decoding into per-channel samples
//! - **Envelope:** Per-sample mean absolute amplitude across channels
//! - **Cues:** Threshold, frame mapping, onset clustering, and count validation

pub mod cue;
pub mod envelope;
pub mod wav;

pub use cue::{CueDetector, CueError};
pub use envelope::envelope;
pub use wav::{AudioTrack, WavError};
