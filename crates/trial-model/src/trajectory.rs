//! Per-trial head trajectory tables and input discovery.
//!
//! A trajectory file holds one JSON document:
//!
//! ```json
//! { "segments": [ [ {"x": 12.0, "y": 40.5}, null, ... ], ... ] }
//! ```
//!
//! `segments[s][f]` is the tracked head position of frame `f` within segment
//! `s`, or `null` when the tracker lost the head.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::point::Point2D;

/// Optional head positions of one segment, indexed by frame.
pub type PositionSeries = Vec<Option<Point2D>>;

/// A (segment × frame) table of optional head positions for one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryTable {
    pub segments: Vec<PositionSeries>,
}

/// On-disk layout. `segments` is optional so its absence is reported by name.
#[derive(Debug, Deserialize)]
struct TrajectoryFile {
    #[serde(default)]
    segments: Option<Vec<PositionSeries>>,
}

impl TrajectoryTable {
    pub fn new(segments: Vec<PositionSeries>) -> Self {
        Self { segments }
    }

    /// Number of segments in the table.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Longest segment, in frames.
    pub fn max_frames(&self) -> usize {
        self.segments.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Count of tracked (non-missing) positions across all segments.
    pub fn tracked_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.iter().filter(|p| p.is_some()).count())
            .sum()
    }

    /// Load a trajectory table, requiring exactly `expected_segments` segments.
    pub fn load(path: impl AsRef<Path>, expected_segments: usize) -> Result<Self, TrajectoryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TrajectoryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: TrajectoryFile =
            serde_json::from_str(&content).map_err(|e| TrajectoryError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        let segments = file
            .segments
            .ok_or_else(|| TrajectoryError::MissingVariable {
                path: path.to_path_buf(),
                name: "segments".to_string(),
            })?;

        if segments.len() != expected_segments {
            return Err(TrajectoryError::SegmentCount {
                path: path.to_path_buf(),
                expected: expected_segments,
                found: segments.len(),
            });
        }

        let table = Self { segments };
        tracing::debug!(
            path = %path.display(),
            frames = table.max_frames(),
            tracked = table.tracked_count(),
            "Loaded trajectory table"
        );
        Ok(table)
    }

    /// Write the table as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TrajectoryError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self).map_err(|e| TrajectoryError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| TrajectoryError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// List trial files in `dir` whose names match `pattern`, in analysis order.
///
/// Files are sorted by the first capture group when it parses as an integer
/// (lexically otherwise), then reordered by `order`: output `k` is sorted
/// file `order[k]`. An empty `order` keeps the sorted order.
pub fn discover_trial_files(
    dir: impl AsRef<Path>,
    pattern: &str,
    order: &[usize],
) -> Result<Vec<PathBuf>, TrajectoryError> {
    let dir = dir.as_ref();
    let regex = Regex::new(pattern).map_err(|e| TrajectoryError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let entries = std::fs::read_dir(dir).map_err(|e| TrajectoryError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut matched: Vec<(Option<u64>, String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            let captures = regex.captures(&name)?;
            let key = captures
                .get(1)
                .and_then(|m| m.as_str().parse::<u64>().ok());
            Some((key, name, path))
        })
        .collect();

    if matched.is_empty() {
        return Err(TrajectoryError::NoInputFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    // Numbered files first in numeric order, the rest lexically.
    matched.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });
    let sorted: Vec<PathBuf> = matched.into_iter().map(|(_, _, path)| path).collect();

    if order.is_empty() {
        return Ok(sorted);
    }

    if order.len() != sorted.len() || !headtrack_common::is_permutation(order) {
        return Err(TrajectoryError::InvalidOrder {
            order: order.to_vec(),
            files: sorted.len(),
        });
    }

    Ok(order.iter().map(|&i| sorted[i].clone()).collect())
}

/// Errors that can occur when locating or reading trajectory files.
#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
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

    #[error("Variable '{name}' missing from {path}")]
    MissingVariable { path: PathBuf, name: String },

    #[error("{path} has {found} segments, expected {expected}")]
    SegmentCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("No files in {dir} match '{pattern}'")]
    NoInputFiles { dir: PathBuf, pattern: String },

    #[error("File order {order:?} is not a permutation of the {files} discovered files")]
    InvalidOrder { order: Vec<usize>, files: usize },
}
