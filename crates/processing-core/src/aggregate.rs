//! Per-segment mean speed across trials.

use serde::Serialize;

use headtrack_model::trajectory::TrajectoryTable;

use crate::velocity::segment_speeds;

/// Mean of the defined entries; `None` when there are none.
pub fn nan_mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean speed per (segment, trial).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityMatrix {
    /// Source of each column, in column order.
    pub files: Vec<String>,
    /// `cells[segment][file]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl VelocityMatrix {
    /// Build the matrix from trials that all have `segments` segments.
    ///
    /// Every speed is multiplied by `scale` before averaging.
    pub fn from_trials(
        trials: &[(String, TrajectoryTable)],
        segments: usize,
        scale: f64,
    ) -> Self {
        let mut cells = vec![Vec::with_capacity(trials.len()); segments];

        for (name, table) in trials {
            let per_segment = segment_speeds(table);
            for (segment, column) in cells.iter_mut().enumerate() {
                let mean = per_segment
                    .get(segment)
                    .and_then(|speeds| nan_mean(speeds))
                    .map(|m| m * scale);
                if mean.is_none() {
                    tracing::warn!(file = %name, segment, "No defined speed for segment");
                }
                column.push(mean);
            }
            tracing::debug!(file = %name, "Aggregated trial");
        }

        Self {
            files: trials.iter().map(|(name, _)| name.clone()).collect(),
            cells,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.cells.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, segment: usize, file: usize) -> Option<f64> {
        self.cells.get(segment)?.get(file).copied().flatten()
    }

    /// Column-major flattening: every segment of file 0, then file 1, ...
    pub fn flatten(&self) -> Vec<Option<f64>> {
        (0..self.file_count())
            .flat_map(|file| (0..self.segment_count()).map(move |segment| (segment, file)))
            .map(|(segment, file)| self.get(segment, file))
            .collect()
    }
}
