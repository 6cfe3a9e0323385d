//! Timebase utilities for aligning audio samples, seconds, and video frames.
//!
//! Every stream in a recording shares time zero: sample 0 of the soundtrack,
//! frame 0 of the video and row 0 of the tracking table.

/// Frame-rate timebase for one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate. Returns `None` unless `fps` is finite and positive.
    pub fn new(fps: f64) -> Option<Self> {
        (fps.is_finite() && fps > 0.0).then_some(Self { fps })
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Start time of a frame in seconds.
    pub fn frame_to_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.fps
    }

    /// Nearest frame to a time in seconds. Negative times clamp to frame 0.
    pub fn secs_to_frame(&self, secs: f64) -> u64 {
        (secs * self.fps).round().max(0.0) as u64
    }

    /// Frame containing an audio sample: `ceil(sample_index * fps / sample_rate)`.
    pub fn sample_to_frame(&self, sample_index: u64, sample_rate: u32) -> u64 {
        (sample_index as f64 * self.fps / sample_rate as f64).ceil() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_rates() {
        assert!(FrameClock::new(0.0).is_none());
        assert!(FrameClock::new(-30.0).is_none());
        assert!(FrameClock::new(f64::NAN).is_none());
        assert!(FrameClock::new(29.97).is_some());
    }

    #[test]
    fn test_secs_frame_conversion() {
        let clock = FrameClock::new(30.0).unwrap();
        assert_eq!(clock.secs_to_frame(2.0), 60);
        assert!((clock.frame_to_secs(45) - 1.5).abs() < 1e-9);
        assert_eq!(clock.secs_to_frame(-1.0), 0);
    }

    #[test]
    fn test_sample_to_frame_rounds_up() {
        let clock = FrameClock::new(30.0).unwrap();
        assert_eq!(clock.sample_to_frame(0, 48_000), 0);
        assert_eq!(clock.sample_to_frame(1, 48_000), 1);
        assert_eq!(clock.sample_to_frame(1_600, 48_000), 1);
        assert_eq!(clock.sample_to_frame(1_601, 48_000), 2);
        assert_eq!(clock.sample_to_frame(48_000, 48_000), 30);
    }
}
