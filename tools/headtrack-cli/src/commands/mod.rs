pub mod annotate;
pub mod config;
pub mod cues;
pub mod velocity;
