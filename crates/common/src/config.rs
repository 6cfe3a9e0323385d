//! Application configuration.
//!
//! Every experiment-specific constant (thresholds, gaps, window lengths,
//! expected counts) lives here so runs can be re-tuned without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HeadtrackError, HeadtrackResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Velocity aggregation (batch) settings.
    pub velocity: VelocityConfig,

    /// Audio cue detection settings.
    pub cues: CueConfig,

    /// Post-cue window extraction settings.
    pub extraction: ExtractionConfig,

    /// Tracking CSV interpretation.
    pub tracking: TrackingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Batch velocity pipeline parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Regex matched against file names in the input directory.
    /// The first capture group, when numeric, sets the sort order.
    pub file_pattern: String,

    /// Permutation applied after sorting: output `k` is sorted file `file_order[k]`.
    /// Empty means identity.
    pub file_order: Vec<usize>,

    /// Number of segments every trajectory file must contain.
    pub segments: usize,

    /// Multiplier from tracked units to physical distance per frame.
    pub distance_scale: f64,
}

/// Audio cue detection parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    /// Envelope level a sample must exceed to count as loud.
    pub threshold: f64,

    /// Frame gap that separates two cue clusters.
    pub min_gap_frames: u64,

    /// Number of cues a recording must contain.
    pub expected_count: usize,

    /// Marked-frame entries to look ahead when checking that a burst is sustained.
    pub burst_lookahead: usize,

    /// Look-ahead window, in multiples of `min_gap_frames`.
    pub burst_window_gaps: u64,
}

/// Post-cue window extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Delay between a cue onset and the start of its window.
    pub offset_secs: f64,

    /// Window length.
    pub duration_secs: f64,

    /// Number of cues (from the first) that produce a window.
    pub segments: usize,
}

/// Tracking CSV parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum body-part likelihood included in the head centre.
    pub confidence: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "headtrack=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            file_pattern: r"^trial_(\d+)\.json$".to_string(),
            file_order: Vec::new(),
            segments: 5,
            distance_scale: 1.0,
        }
    }
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            threshold: 0.02,
            min_gap_frames: 20,
            expected_count: 7,
            burst_lookahead: 5,
            burst_window_gaps: 5,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            offset_secs: 30.0,
            duration_secs: 10.0,
            segments: 5,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { confidence: 0.8 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], failures are errors.
    pub fn load_from(path: &Path) -> HeadtrackResult<Self> {
        if !path.exists() {
            return Err(HeadtrackError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location, returning the path written.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Reject values the pipelines cannot run with.
    pub fn validate(&self) -> HeadtrackResult<()> {
        if self.velocity.segments == 0 {
            return Err(HeadtrackError::config("velocity.segments must be positive"));
        }
        if !self.velocity.file_order.is_empty() && !is_permutation(&self.velocity.file_order) {
            return Err(HeadtrackError::config(format!(
                "velocity.file_order {:?} is not a permutation of 0..{}",
                self.velocity.file_order,
                self.velocity.file_order.len()
            )));
        }
        if self.cues.threshold < 0.0 {
            return Err(HeadtrackError::config("cues.threshold must be non-negative"));
        }
        if self.cues.expected_count == 0 {
            return Err(HeadtrackError::config("cues.expected_count must be positive"));
        }
        if self.extraction.duration_secs <= 0.0 {
            return Err(HeadtrackError::config(
                "extraction.duration_secs must be positive",
            ));
        }
        if self.extraction.segments == 0 || self.extraction.segments > self.cues.expected_count {
            return Err(HeadtrackError::config(format!(
                "extraction.segments must be in 1..={}",
                self.cues.expected_count
            )));
        }
        if !(0.0..=1.0).contains(&self.tracking.confidence) {
            return Err(HeadtrackError::config(
                "tracking.confidence must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Whether `order` contains every index of `0..order.len()` exactly once.
pub fn is_permutation(order: &[usize]) -> bool {
    let mut seen = vec![false; order.len()];
    for &i in order {
        match seen.get_mut(i) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("headtrack").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_experiment_constants() {
        let config = AppConfig::default();
        assert_eq!(config.velocity.segments, 5);
        assert!((config.cues.threshold - 0.02).abs() < 1e-12);
        assert_eq!(config.cues.min_gap_frames, 20);
        assert_eq!(config.cues.expected_count, 7);
        assert_eq!(config.cues.burst_lookahead, 5);
        assert!((config.extraction.offset_secs - 30.0).abs() < 1e-12);
        assert!((config.extraction.duration_secs - 10.0).abs() < 1e-12);
        assert!((config.tracking.confidence - 0.8).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"cues":{"threshold":0.05}}"#).unwrap();
        assert!((config.cues.threshold - 0.05).abs() < 1e-12);
        assert_eq!(config.cues.expected_count, 7);
        assert_eq!(config.extraction.segments, 5);
    }

    #[test]
    fn test_permutation_check() {
        assert!(is_permutation(&[]));
        assert!(is_permutation(&[2, 0, 1]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 3, 1]));
    }

    #[test]
    fn test_validate_rejects_bad_order() {
        let mut config = AppConfig::default();
        config.velocity.file_order = vec![1, 1];
        assert!(matches!(
            config.validate(),
            Err(HeadtrackError::Config { .. })
        ));
    }

    #[test]
    fn test_load_from_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            AppConfig::load_from(&missing),
            Err(HeadtrackError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction":{"offset_secs":12.5}}"#).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert!((config.extraction.offset_secs - 12.5).abs() < 1e-12);
    }
}
