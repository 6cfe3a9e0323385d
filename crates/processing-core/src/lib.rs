//! Headtrack Processing Core
//!
//! Turns tracked head positions into analysis results:
//! - **Interpolation:** Fill tracking gaps by linear interpolation/extrapolation
//! - **Velocity:** Frame-to-frame speed of the interpolated head position
//! - **Aggregation:** Mean speed per (segment, trial) and the flattened matrix
//! - **Segments:** Cut fixed post-cue windows out of frame-aligned streams
//!
//! This crate is pure computation with no I/O.
//! All inputs are data; all outputs are data.

pub mod aggregate;
pub mod interpolate;
pub mod segments;
pub mod velocity;

pub use aggregate::{nan_mean, VelocityMatrix};
pub use interpolate::{interpolate_axis, interpolate_positions};
pub use segments::{ExtractedSegment, SegmentError, SegmentExtractor, SegmentWindow};
pub use velocity::{segment_speeds, speeds};
