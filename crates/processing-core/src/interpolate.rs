//! Gap filling for tracked positions.
//!
//! Each axis is filled independently by piecewise-linear interpolation over
//! frame index, and extended past the first/last tracked frame with the
//! slope of the nearest two tracked frames. No smoothing is applied: tracked
//! values come back unchanged.

use headtrack_model::point::Point2D;

/// Fill the gaps of one axis.
///
/// Returns all `None` when fewer than two finite values exist. Non-finite
/// values count as missing.
pub fn interpolate_axis(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i, v)))
        .collect();

    if known.len() < 2 {
        return vec![None; values.len()];
    }

    let first = known[0].0;
    let last = known[known.len() - 1].0;

    (0..values.len())
        .map(|k| {
            let (a, b) = if k <= first {
                (known[0], known[1])
            } else if k >= last {
                (known[known.len() - 2], known[known.len() - 1])
            } else {
                // Index of the first known sample at or after k.
                let hi = known.partition_point(|&(i, _)| i < k);
                if known[hi].0 == k {
                    return Some(known[hi].1);
                }
                (known[hi - 1], known[hi])
            };
            Some(line_through(a, b, k))
        })
        .collect()
}

/// Fill the gaps of a position series, one axis at a time.
///
/// A frame is defined only when both axes are.
pub fn interpolate_positions(series: &[Option<Point2D>]) -> Vec<Option<Point2D>> {
    let xs: Vec<Option<f64>> = series.iter().map(|p| p.map(|p| p.x)).collect();
    let ys: Vec<Option<f64>> = series.iter().map(|p| p.map(|p| p.y)).collect();

    let filled: Vec<Option<Point2D>> = interpolate_axis(&xs)
        .into_iter()
        .zip(interpolate_axis(&ys))
        .map(|(x, y)| Some(Point2D::new(x?, y?)))
        .collect();

    if !series.is_empty() && filled.iter().all(Option::is_none) {
        tracing::warn!(
            frames = series.len(),
            "Fewer than two tracked frames; segment left undefined"
        );
    }

    filled
}

/// Value at `k` on the line through two known samples.
fn line_through((i0, v0): (usize, f64), (i1, v1): (usize, f64), k: usize) -> f64 {
    if k == i0 {
        return v0;
    }
    if k == i1 {
        return v1;
    }
    let t = (k as f64 - i0 as f64) / (i1 as f64 - i0 as f64);
    v0 + (v1 - v0) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_interior_gap_is_linear() {
        let filled = interpolate_axis(&[Some(0.0), None, None, Some(3.0)]);
        assert!(close(filled[1], 1.0));
        assert!(close(filled[2], 2.0));
    }

    #[test]
    fn test_extrapolates_both_ends() {
        let filled = interpolate_axis(&[None, None, Some(2.0), Some(3.0), None, Some(7.0), None]);
        // leading slope from (2,2)-(3,3); trailing slope from (3,3)-(5,7)
        assert!(close(filled[0], 0.0));
        assert!(close(filled[1], 1.0));
        assert!(close(filled[4], 5.0));
        assert!(close(filled[6], 9.0));
    }

    #[test]
    fn test_single_sample_leaves_axis_undefined() {
        assert_eq!(interpolate_axis(&[None, Some(4.0), None]), vec![None; 3]);
        assert_eq!(interpolate_axis(&[]), Vec::<Option<f64>>::new());
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let filled = interpolate_axis(&[Some(0.0), Some(f64::NAN), Some(2.0)]);
        assert!(close(filled[1], 1.0));
    }

    #[test]
    fn test_positions_fill_both_axes() {
        let series = vec![
            Some(Point2D::new(0.0, 10.0)),
            None,
            Some(Point2D::new(4.0, 14.0)),
        ];
        let filled = interpolate_positions(&series);
        assert_eq!(filled[1], Some(Point2D::new(2.0, 12.0)));
    }

    #[test]
    fn test_positions_with_one_sample_all_undefined() {
        let series = vec![None, Some(Point2D::new(1.0, 1.0)), None];
        assert!(interpolate_positions(&series).iter().all(Option::is_none));
    }

    fn sparse_series() -> impl Strategy<Value = Vec<Option<f64>>> {
        prop::collection::vec(prop::option::of(-1.0e3..1.0e3f64), 0..60)
    }

    proptest! {
        #[test]
        fn prop_defined_when_two_known(values in sparse_series()) {
            let known = values.iter().filter(|v| v.is_some()).count();
            let filled = interpolate_axis(&values);
            prop_assert_eq!(filled.len(), values.len());

            if known >= 2 {
                prop_assert!(filled.iter().all(Option::is_some));
                for (input, output) in values.iter().zip(&filled) {
                    if let Some(v) = input {
                        prop_assert_eq!(Some(*v), *output);
                    }
                }
            } else {
                prop_assert!(filled.iter().all(Option::is_none));
            }
        }

        #[test]
        fn prop_interior_values_bounded_by_neighbours(values in sparse_series()) {
            let filled = interpolate_axis(&values);
            let known: Vec<(usize, f64)> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .collect();

            for pair in known.windows(2) {
                let (lo, hi) = (pair[0].1.min(pair[1].1), pair[0].1.max(pair[1].1));
                for k in pair[0].0..=pair[1].0 {
                    let v = filled[k].unwrap();
                    prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
                }
            }
        }
    }
}
