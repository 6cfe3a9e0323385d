use std::path::Path;

use headtrack_model::point::Point2D;
use headtrack_model::trajectory::{discover_trial_files, TrajectoryTable};
use headtrack_processing::aggregate::VelocityMatrix;

const PATTERN: &str = r"^trial_(\d+)\.json$";
const SEGMENTS: usize = 5;

/// Trial whose segment `s` moves `(s + 1) * speed` per frame along a 3-4-5 diagonal,
/// with every third frame lost by the tracker.
fn write_trial(dir: &Path, number: usize, speed: f64) {
    let segments = (0..SEGMENTS)
        .map(|s| {
            let step = (s + 1) as f64 * speed;
            (0..30)
                .map(|f| {
                    (f % 3 != 1).then(|| Point2D::new(f as f64 * step * 3.0, f as f64 * step * 4.0))
                })
                .collect()
        })
        .collect();

    TrajectoryTable::new(segments)
        .save(dir.join(format!("trial_{number}.json")))
        .expect("trial fixture should be writable");
}

fn run(dir: &Path, order: &[usize]) -> Vec<Option<f64>> {
    let files = discover_trial_files(dir, PATTERN, order).expect("discovery should succeed");
    let trials: Vec<(String, TrajectoryTable)> = files
        .iter()
        .map(|path| {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            (name, TrajectoryTable::load(path, SEGMENTS).unwrap())
        })
        .collect();
    VelocityMatrix::from_trials(&trials, SEGMENTS, 1.0).flatten()
}

fn assert_means(actual: &[Option<f64>], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        let a = a.expect("every segment should have a mean");
        assert!((a - e).abs() < 1e-9, "mean {a} != {e}");
    }
}

#[test]
fn gaps_are_filled_before_averaging() {
    headtrack_common::logging::init_default_logging();
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), 1, 1.0);
    write_trial(dir.path(), 2, 2.0);

    let means = run(dir.path(), &[]);
    assert_means(
        &means,
        &[5.0, 10.0, 15.0, 20.0, 25.0, 10.0, 20.0, 30.0, 40.0, 50.0],
    );
}

#[test]
fn permutation_reorders_matrix_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_trial(dir.path(), 1, 1.0);
    write_trial(dir.path(), 2, 2.0);

    let means = run(dir.path(), &[1, 0]);
    assert_means(
        &means,
        &[10.0, 20.0, 30.0, 40.0, 50.0, 5.0, 10.0, 15.0, 20.0, 25.0],
    );
}
