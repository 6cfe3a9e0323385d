//! Mean speed per segment across a directory of trial files.

use std::path::{Path, PathBuf};

use serde::Serialize;

use headtrack_common::config::AppConfig;
use headtrack_model::trajectory::{discover_trial_files, TrajectoryTable};
use headtrack_processing::VelocityMatrix;

pub fn run(
    mut config: AppConfig,
    dir: PathBuf,
    pattern: Option<String>,
    order: Option<Vec<usize>>,
    scale: Option<f64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(pattern) = pattern {
        config.velocity.file_pattern = pattern;
    }
    if let Some(order) = order {
        config.velocity.file_order = order;
    }
    if let Some(scale) = scale {
        config.velocity.distance_scale = scale;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let settings = &config.velocity;

    println!("Scanning {} for trial files", dir.display());
    let files = discover_trial_files(&dir, &settings.file_pattern, &settings.file_order)
        .map_err(|e| anyhow::anyhow!("Failed to list trial files: {e}"))?;

    let mut trials = Vec::with_capacity(files.len());
    for path in &files {
        let table = TrajectoryTable::load(path, settings.segments)
            .map_err(|e| anyhow::anyhow!("Failed to load trajectories: {e}"))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!(
            "  {name}: {} segments, {} tracked positions",
            table.segment_count(),
            table.tracked_count()
        );
        trials.push((name, table));
    }

    let matrix = VelocityMatrix::from_trials(&trials, settings.segments, settings.distance_scale);

    println!("\nMean speed per segment:");
    for (file, name) in matrix.files.iter().enumerate() {
        let means: Vec<String> = (0..matrix.segment_count())
            .map(|segment| fmt_mean(matrix.get(segment, file)))
            .collect();
        println!("  {name}: {}", means.join("  "));
    }

    let flat: Vec<String> = matrix.flatten().into_iter().map(fmt_mean).collect();
    println!("\n{}", flat.join(" "));

    if let Some(path) = output {
        write_matrix(&matrix, &path)?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

fn fmt_mean(mean: Option<f64>) -> String {
    match mean {
        Some(v) => format!("{v:.4}"),
        None => "nan".to_string(),
    }
}

#[derive(Serialize)]
struct MatrixRow<'a> {
    file: &'a str,
    segment: usize,
    mean_speed: Option<f64>,
}

/// Write the matrix as JSON or as long-format CSV, chosen by extension.
fn write_matrix(matrix: &VelocityMatrix, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let json = serde_json::to_string_pretty(matrix)?;
            std::fs::write(path, json)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        }
        Some("csv") => {
            let mut writer = csv::Writer::from_path(path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
            for (file, name) in matrix.files.iter().enumerate() {
                for segment in 0..matrix.segment_count() {
                    writer.serialize(MatrixRow {
                        file: name,
                        segment,
                        mean_speed: matrix.get(segment, file),
                    })?;
                }
            }
            writer.flush()?;
        }
        _ => anyhow::bail!(
            "Unsupported output format for {} (use .json or .csv)",
            path.display()
        ),
    }

    tracing::info!(path = %path.display(), "Wrote velocity matrix");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> VelocityMatrix {
        VelocityMatrix {
            files: vec!["trial_1.json".to_string(), "trial_2.json".to_string()],
            cells: vec![vec![Some(1.5), None], vec![Some(2.0), Some(3.0)]],
        }
    }

    #[test]
    fn test_csv_output_is_file_major() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speeds.csv");
        write_matrix(&matrix(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "file,segment,mean_speed");
        assert_eq!(lines[1], "trial_1.json,0,1.5");
        assert_eq!(lines[3], "trial_2.json,0,");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_json_output_uses_null_for_undefined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("speeds.json");
        write_matrix(&matrix(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["cells"][0][1].is_null());
        assert_eq!(value["files"][1], "trial_2.json");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_matrix(&matrix(), &dir.path().join("speeds.txt")).is_err());
    }

    #[test]
    fn test_undefined_means_print_as_nan() {
        assert_eq!(fmt_mean(None), "nan");
        assert_eq!(fmt_mean(Some(2.0)), "2.0000");
    }
}
