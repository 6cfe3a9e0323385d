//! Headtrack Common Utilities
//!
//! Shared infrastructure for all headtrack crates:
//! - Error types and result aliases
//! - Frame/sample timebase conversions
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
