//! Row-per-frame tracking tables.
//!
//! The tracker writes a CSV with three header rows (scorer, body part,
//! coordinate name) followed by one row per video frame:
//!
//! ```text
//! scorer,     net,  net,  net,        net,  net,  net
//! bodyparts,  ear_l,ear_l,ear_l,      ear_r,ear_r,ear_r
//! coords,     x,    y,    likelihood, x,    y,    likelihood
//! 0,          101.2,88.0, 0.97,       140.3,87.1, 0.42
//! ```
//!
//! Column 0 is the frame index; each body part contributes an
//! `(x, y, likelihood)` triplet.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::point::Point2D;

/// Number of header rows preceding the data.
const HEADER_ROWS: usize = 3;

/// One body part observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartSample {
    pub position: Point2D,
    pub likelihood: f64,
}

/// All body part observations for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRow {
    pub frame: u64,
    /// Indexed like [`CoordinateTable::body_parts`]; `None` when a cell was empty.
    pub parts: Vec<Option<PartSample>>,
}

impl CoordinateRow {
    /// Mean position of the body parts seen with at least `confidence` likelihood.
    pub fn center(&self, confidence: f64) -> Option<Point2D> {
        let confident: Vec<Point2D> = self
            .parts
            .iter()
            .flatten()
            .filter(|s| s.likelihood >= confidence)
            .map(|s| s.position)
            .collect();
        Point2D::centroid(&confident)
    }
}

/// A parsed tracking CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTable {
    pub body_parts: Vec<String>,
    pub rows: Vec<CoordinateRow>,
}

impl CoordinateTable {
    /// Parse a tracking CSV from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoordinateError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| CoordinateError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::from_reader(file).map_err(|e| e.with_path(path))?;
        tracing::debug!(
            path = %path.display(),
            rows = table.rows.len(),
            parts = table.body_parts.len(),
            "Loaded coordinate table"
        );
        Ok(table)
    }

    /// Parse a tracking CSV from any reader.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, CoordinateError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = rdr.records();
        let mut headers = Vec::with_capacity(HEADER_ROWS);
        for _ in 0..HEADER_ROWS {
            match records.next() {
                Some(record) => headers.push(record.map_err(CoordinateError::from_csv)?),
                None => return Err(CoordinateError::MissingHeader { path: None }),
            }
        }

        let part_row = &headers[1];
        let body_parts: Vec<String> = part_row
            .iter()
            .skip(1)
            .step_by(3)
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in records.enumerate() {
            let record = record.map_err(CoordinateError::from_csv)?;
            let line = i + HEADER_ROWS + 1;

            let frame = record
                .get(0)
                .and_then(parse_frame_index)
                .ok_or_else(|| CoordinateError::BadRow {
                    path: None,
                    line,
                    message: "frame index is not a non-negative integer".to_string(),
                })?;

            let parts = (0..body_parts.len())
                .map(|p| {
                    let cell = |offset: usize| {
                        record
                            .get(1 + p * 3 + offset)
                            .filter(|s| !s.is_empty())
                            .map(|s| s.parse::<f64>())
                            .transpose()
                    };
                    match (cell(0), cell(1), cell(2)) {
                        (Ok(Some(x)), Ok(Some(y)), Ok(Some(likelihood))) => Ok(Some(PartSample {
                            position: Point2D::new(x, y),
                            likelihood,
                        })),
                        (Ok(_), Ok(_), Ok(_)) => Ok(None),
                        _ => Err(CoordinateError::BadRow {
                            path: None,
                            line,
                            message: format!("non-numeric value for '{}'", body_parts[p]),
                        }),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            rows.push(CoordinateRow { frame, parts });
        }

        Ok(Self { body_parts, rows })
    }

    /// Head centre per row, using only parts at or above `confidence`.
    pub fn centers(&self, confidence: f64) -> Vec<Option<Point2D>> {
        self.rows.iter().map(|row| row.center(confidence)).collect()
    }
}

/// Frame indices are written as integers, occasionally as `12.0`.
fn parse_frame_index(field: &str) -> Option<u64> {
    field.parse::<u64>().ok().or_else(|| {
        let value = field.parse::<f64>().ok()?;
        (value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
    })
}

/// Errors that can occur when reading a tracking CSV.
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error{}: {source}", fmt_path(.path))]
    Csv {
        path: Option<PathBuf>,
        source: csv::Error,
    },

    #[error("Tracking table{} is missing its header rows", fmt_path(.path))]
    MissingHeader { path: Option<PathBuf> },

    #[error("Bad row at line {line}{}: {message}", fmt_path(.path))]
    BadRow {
        path: Option<PathBuf>,
        line: usize,
        message: String,
    },
}

impl CoordinateError {
    fn from_csv(source: csv::Error) -> Self {
        Self::Csv { path: None, source }
    }

    fn with_path(self, file: &Path) -> Self {
        let file = Some(file.to_path_buf());
        match self {
            Self::Csv { source, .. } => Self::Csv { path: file, source },
            Self::MissingHeader { .. } => Self::MissingHeader { path: file },
            Self::BadRow { line, message, .. } => Self::BadRow {
                path: file,
                line,
                message,
            },
            other => other,
        }
    }
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}
