//! Fixed post-cue windows over frame-aligned streams.

use std::ops::Range;

use headtrack_common::clock::FrameClock;
use headtrack_common::config::ExtractionConfig;

/// Frame range of one window and the cue that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentWindow {
    pub index: usize,
    pub cue_frame: u64,
    pub start_frame: u64,
    /// Exclusive.
    pub end_frame: u64,
}

impl SegmentWindow {
    pub fn len(&self) -> usize {
        (self.end_frame - self.start_frame) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end_frame == self.start_frame
    }

    pub fn range(&self) -> Range<usize> {
        self.start_frame as usize..self.end_frame as usize
    }
}

/// One extracted window: the video frames and the tracking rows it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSegment<F, R> {
    pub window: SegmentWindow,
    pub frames: Vec<F>,
    pub rows: Vec<R>,
}

/// Cuts `duration_secs` windows starting `offset_secs` after each cue.
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    config: ExtractionConfig,
}

impl SegmentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ExtractionConfig::default())
    }

    /// Window positions for the first `segments` cues.
    pub fn windows(
        &self,
        cues: &[u64],
        clock: FrameClock,
    ) -> Result<Vec<SegmentWindow>, SegmentError> {
        if cues.len() < self.config.segments {
            return Err(SegmentError::NotEnoughCues {
                needed: self.config.segments,
                found: cues.len(),
            });
        }

        Ok(cues
            .iter()
            .take(self.config.segments)
            .enumerate()
            .map(|(index, &cue_frame)| {
                let start_secs = clock.frame_to_secs(cue_frame) + self.config.offset_secs;
                let end_secs = start_secs + self.config.duration_secs;
                SegmentWindow {
                    index,
                    cue_frame,
                    start_frame: clock.secs_to_frame(start_secs),
                    end_frame: clock.secs_to_frame(end_secs),
                }
            })
            .collect())
    }

    /// Cut every window out of `frames` and the aligned `rows`.
    ///
    /// Both streams are indexed by video frame. A window that runs past
    /// the end of either stream is an error.
    pub fn extract<F: Clone, R: Clone>(
        &self,
        cues: &[u64],
        clock: FrameClock,
        frames: &[F],
        rows: &[R],
    ) -> Result<Vec<ExtractedSegment<F, R>>, SegmentError> {
        let windows = self.windows(cues, clock)?;

        windows
            .into_iter()
            .map(|window| {
                let range = window.range();
                let frames = slice_window(frames, &range, window, "video")?;
                let rows = slice_window(rows, &range, window, "tracking")?;
                tracing::info!(
                    segment = window.index,
                    cue_frame = window.cue_frame,
                    start_frame = window.start_frame,
                    frames = frames.len(),
                    "Extracted segment"
                );
                Ok(ExtractedSegment {
                    window,
                    frames,
                    rows,
                })
            })
            .collect()
    }
}

fn slice_window<T: Clone>(
    items: &[T],
    range: &Range<usize>,
    window: SegmentWindow,
    stream: &'static str,
) -> Result<Vec<T>, SegmentError> {
    items
        .get(range.clone())
        .map(<[T]>::to_vec)
        .ok_or(SegmentError::OutOfRange {
            segment: window.index,
            stream,
            start: window.start_frame,
            end: window.end_frame,
            available: items.len(),
        })
}

/// Errors that can occur while cutting windows.
#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("Need {needed} cues to extract segments, found {found}")]
    NotEnoughCues { needed: usize, found: usize },

    #[error("Segment {segment} spans frames {start}..{end} but the {stream} stream has {available}")]
    OutOfRange {
        segment: usize,
        stream: &'static str,
        start: u64,
        end: u64,
        available: usize,
    },
}
