//! Cue onset detection.
//!
//! A cue is a sustained loud event in the soundtrack. Detection runs in
//! four steps:
//!
//! 1. mark every sample whose envelope exceeds `threshold`;
//! 2. map marked samples to video frames and deduplicate;
//! 3. start a new cluster wherever consecutive marked frames are more than
//!    `min_gap_frames` apart;
//! 4. keep a cluster start only if the marked frame `burst_lookahead`
//!    entries later is still within `burst_window_gaps * min_gap_frames`
//!    frames of it. Isolated clicks fail this check. A start with fewer
//!    than `burst_lookahead` marked frames after it is kept.
//!
//! The surviving starts must number exactly `expected_count`.

use serde::Serialize;

use headtrack_common::clock::FrameClock;
use headtrack_common::config::CueConfig;

use crate::envelope::envelope;
use crate::wav::AudioTrack;

/// Outcome of cue analysis, before count validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueReport {
    /// Accepted onset frames, ascending.
    pub onsets: Vec<u64>,
    /// Cluster starts rejected as short bursts.
    pub rejected: Vec<u64>,
    /// Number of distinct frames containing a loud sample.
    pub loud_frames: usize,
}

/// Threshold-and-cluster cue detector.
#[derive(Debug, Clone)]
pub struct CueDetector {
    config: CueConfig,
}

impl CueDetector {
    pub fn new(config: CueConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CueConfig::default())
    }

    pub fn config(&self) -> &CueConfig {
        &self.config
    }

    /// Detect cues in a decoded soundtrack, requiring the expected count.
    pub fn detect(&self, track: &AudioTrack, clock: FrameClock) -> Result<Vec<u64>, CueError> {
        self.detect_envelope(&envelope(track), track.sample_rate, clock)
    }

    /// Detect cues in a precomputed envelope, requiring the expected count.
    pub fn detect_envelope(
        &self,
        envelope: &[f32],
        sample_rate: u32,
        clock: FrameClock,
    ) -> Result<Vec<u64>, CueError> {
        let report = self.analyze(envelope, sample_rate, clock)?;
        self.require_expected(report)
    }

    /// Accept a report only when it holds exactly `expected_count` onsets.
    pub fn require_expected(&self, report: CueReport) -> Result<Vec<u64>, CueError> {
        if report.onsets.len() != self.config.expected_count {
            return Err(CueError::CountMismatch {
                expected: self.config.expected_count,
                found: report.onsets.len(),
                onsets: report.onsets,
            });
        }
        tracing::info!(onsets = ?report.onsets, "Detected cues");
        Ok(report.onsets)
    }

    /// Run detection without validating the count.
    pub fn analyze(
        &self,
        envelope: &[f32],
        sample_rate: u32,
        clock: FrameClock,
    ) -> Result<CueReport, CueError> {
        if sample_rate == 0 {
            return Err(CueError::InvalidSampleRate);
        }

        let frames = self.loud_frames(envelope, sample_rate, clock);
        let starts = self.cluster_starts(&frames);
        let (onsets, rejected) = self.split_sustained(&frames, &starts);

        tracing::debug!(
            loud_frames = frames.len(),
            clusters = starts.len(),
            rejected = rejected.len(),
            "Clustered loud frames"
        );

        Ok(CueReport {
            onsets,
            rejected,
            loud_frames: frames.len(),
        })
    }

    /// Distinct frames (ascending) that contain a sample above the threshold.
    pub fn loud_frames(&self, envelope: &[f32], sample_rate: u32, clock: FrameClock) -> Vec<u64> {
        let threshold = self.config.threshold;
        let mut frames: Vec<u64> = envelope
            .iter()
            .enumerate()
            .filter(|(_, &level)| f64::from(level) > threshold)
            .map(|(i, _)| clock.sample_to_frame(i as u64, sample_rate))
            .collect();
        // Mapping is monotonic, so duplicates are adjacent.
        frames.dedup();
        frames
    }

    /// Positions in `frames` that open a new cluster.
    pub fn cluster_starts(&self, frames: &[u64]) -> Vec<usize> {
        (0..frames.len())
            .filter(|&i| i == 0 || frames[i] - frames[i - 1] > self.config.min_gap_frames)
            .collect()
    }

    /// Split cluster starts into sustained onsets and rejected short bursts.
    fn split_sustained(&self, frames: &[u64], starts: &[usize]) -> (Vec<u64>, Vec<u64>) {
        let lookahead = self.config.burst_lookahead;
        let window = self.config.burst_window_gaps * self.config.min_gap_frames;

        starts
            .iter()
            .map(|&p| {
                let sustained = frames
                    .get(p + lookahead)
                    .map_or(true, |&ahead| ahead - frames[p] <= window);
                (frames[p], sustained)
            })
            .fold((Vec::new(), Vec::new()), |(mut kept, mut dropped), (frame, sustained)| {
                if sustained {
                    kept.push(frame);
                } else {
                    tracing::debug!(frame, "Rejected short burst");
                    dropped.push(frame);
                }
                (kept, dropped)
            })
    }
}

/// Errors that can occur during cue detection.
#[derive(Debug, thiserror::Error)]
pub enum CueError {
    #[error("Expected {expected} cues but found {found} (onset frames {onsets:?})")]
    CountMismatch {
        expected: usize,
        found: usize,
        onsets: Vec<u64>,
    },

    #[error("Audio sample rate must be positive")]
    InvalidSampleRate,
}
