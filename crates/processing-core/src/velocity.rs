//! Frame-to-frame head speed.

use headtrack_model::point::Point2D;
use headtrack_model::trajectory::TrajectoryTable;

use crate::interpolate::interpolate_positions;

/// Distance travelled between each pair of consecutive frames.
///
/// A series of `n` positions yields `n - 1` speeds (none for `n < 2`).
/// A speed is `None` when either of its frames is undefined. Units are
/// tracked units per frame; scaling is left to the caller.
pub fn speeds(positions: &[Option<Point2D>]) -> Vec<Option<f64>> {
    positions
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(a), Some(b)) => Some(a.distance_to(&b)),
            _ => None,
        })
        .collect()
}

/// Interpolate every segment of a trial and convert it to speeds.
pub fn segment_speeds(table: &TrajectoryTable) -> Vec<Vec<Option<f64>>> {
    table
        .segments
        .iter()
        .enumerate()
        .map(|(segment, series)| {
            let filled = interpolate_positions(series);
            let speeds = speeds(&filled);
            tracing::trace!(segment, frames = series.len(), "Computed segment speeds");
            speeds
        })
        .collect()
}
