//! Manually annotated points and their on-disk form.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::point::Point2D;

/// One optional point per (segment, frame).
///
/// The shape is fixed at construction; out-of-range writes are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointStore {
    segments: Vec<Vec<Option<Point2D>>>,
}

impl PointStore {
    /// Empty store with `frame_counts[s]` frames in segment `s`.
    pub fn new(frame_counts: &[usize]) -> Self {
        Self {
            segments: frame_counts.iter().map(|&n| vec![None; n]).collect(),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Frames in `segment`, zero when out of range.
    pub fn frame_count(&self, segment: usize) -> usize {
        self.segments.get(segment).map_or(0, Vec::len)
    }

    /// Frame counts of every segment.
    pub fn shape(&self) -> Vec<usize> {
        self.segments.iter().map(Vec::len).collect()
    }

    pub fn get(&self, segment: usize, frame: usize) -> Option<Point2D> {
        self.segments.get(segment)?.get(frame).copied().flatten()
    }

    /// Store (or overwrite) a point. Returns `false` if the slot does not exist.
    pub fn set(&mut self, segment: usize, frame: usize, point: Point2D) -> bool {
        match self.segments.get_mut(segment).and_then(|s| s.get_mut(frame)) {
            Some(slot) => {
                *slot = Some(point);
                true
            }
            None => false,
        }
    }

    /// First frame of `segment` without a point, in frame order.
    pub fn first_unmarked(&self, segment: usize) -> Option<usize> {
        self.segments.get(segment)?.iter().position(Option::is_none)
    }

    /// Whether every frame of `segment` has a point.
    pub fn is_segment_complete(&self, segment: usize) -> bool {
        self.first_unmarked(segment).is_none()
    }

    /// Total number of marked frames.
    pub fn marked_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.iter().filter(|p| p.is_some()).count())
            .sum()
    }

    /// Points of one segment in frame order.
    pub fn segment(&self, segment: usize) -> Option<&[Option<Point2D>]> {
        self.segments.get(segment).map(Vec::as_slice)
    }
}

/// Metadata for one annotated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnnotation {
    /// Segment index (0-based cue order).
    pub index: usize,
    /// Video frame of the cue onset.
    pub cue_frame: u64,
    /// First video frame of the window.
    pub start_frame: u64,
    /// One entry per window frame.
    pub points: Vec<Option<Point2D>>,
}

/// Annotation output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFile {
    /// Schema version.
    pub version: String,

    /// Creation timestamp (RFC 3339).
    pub created_at: String,

    /// Name of the annotated recording.
    pub source: String,

    /// Video frame rate the frame indices refer to.
    pub fps: f64,

    pub segments: Vec<SegmentAnnotation>,
}

/// Placement of one annotated window in the source video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlacement {
    pub cue_frame: u64,
    pub start_frame: u64,
}

impl AnnotationFile {
    /// Snapshot a store. `windows[s]` places segment `s` in the source video;
    /// there must be exactly one window per segment.
    pub fn from_store(
        source: impl Into<String>,
        fps: f64,
        windows: &[WindowPlacement],
        store: &PointStore,
    ) -> Result<Self, AnnotationError> {
        if windows.len() != store.segment_count() {
            return Err(AnnotationError::WindowCount {
                windows: windows.len(),
                segments: store.segment_count(),
            });
        }

        let segments = store
            .segments
            .iter()
            .zip(windows)
            .enumerate()
            .map(|(index, (points, window))| SegmentAnnotation {
                index,
                cue_frame: window.cue_frame,
                start_frame: window.start_frame,
                points: points.clone(),
            })
            .collect();

        Ok(Self {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
            fps,
            segments,
        })
    }

    /// Rebuild the point store.
    pub fn to_store(&self) -> PointStore {
        PointStore {
            segments: self.segments.iter().map(|s| s.points.clone()).collect(),
        }
    }

    /// Rebuild the point store, requiring `expected` frames per segment.
    pub fn store_with_shape(&self, expected: &[usize]) -> Result<PointStore, AnnotationError> {
        let store = self.to_store();
        let found = store.shape();
        if found != expected {
            return Err(AnnotationError::ShapeMismatch {
                expected: expected.to_vec(),
                found,
            });
        }
        Ok(store)
    }

    /// Load an annotation file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnnotationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AnnotationError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| AnnotationError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the file as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AnnotationError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AnnotationError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| AnnotationError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| AnnotationError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            marked = self.to_store().marked_count(),
            "Saved annotations"
        );
        Ok(())
    }
}

/// Errors that can occur when reading or writing annotation files.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Annotation shape {found:?} does not match the extracted windows {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("{windows} window placements given for {segments} annotated segments")]
    WindowCount { windows: usize, segments: usize },
}
