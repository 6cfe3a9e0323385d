//! Headtrack Data Model
//!
//! Defines the data contracts shared by both pipelines:
//! - **Points:** 2D positions in tracked (pixel) units
//! - **Trajectories:** per-trial (segment × frame) tables of optional head positions
//! - **Coordinates:** row-per-frame tracking CSVs and their confident head centre
//! - **Annotations:** manually marked points, persisted as JSON
//!
//! A missing point is always `None`, never a sentinel value.

pub mod annotation;
pub mod coords;
pub mod point;
pub mod trajectory;

pub use annotation::*;
pub use coords::*;
pub use point::*;
pub use trajectory::*;
