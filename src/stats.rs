// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Numerical reductions used by the correction and analysis functions:
//! least-squares fits, means, standard deviations and histograms.

use nalgebra::{DMatrix, DVector, SVD};
use serde::Serialize;

use crate::errors::GridError;
use crate::grid::HeightGrid;

/// Default number of bins of the height distribution.
pub const DEFAULT_N_BINS: usize = 100;

/// Coefficients of a plane `z = a*x + b*y + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PlaneFit {
    #[inline(always)]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.a * x + self.b * y + self.c
    }
}

/// Coefficients of a line `z = m*x + q`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineFit {
    pub m: f64,
    pub q: f64,
}

impl LineFit {
    #[inline(always)]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.m * x + self.q
    }
}

/// Histogram of values with equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Centers of the bins.
    pub centers: Vec<f64>,
    /// Number of values in each bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Width of a single bin.
    pub fn bin_width(&self) -> f64 {
        match self.centers.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }

    /// Total number of counted values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Solve the linear least-squares problem `design * coeffs ≈ z`.
///
/// Fails if the design matrix does not have full column rank.
fn least_squares(design: DMatrix<f64>, z: DVector<f64>) -> Result<DVector<f64>, GridError> {
    let (points, n_coeffs) = design.shape();
    let svd = SVD::new(design, true, true);

    // same cutoff as LAPACK-based solvers: machine epsilon scaled by the problem size
    let largest = svd.singular_values.max();
    let tolerance = f64::EPSILON * points.max(n_coeffs) as f64 * largest;
    let rank = svd.rank(tolerance);

    if largest <= 0.0 || rank < n_coeffs {
        return Err(GridError::DegenerateFit { points, rank });
    }

    svd.solve(&z, tolerance)
        .map_err(|_| GridError::DegenerateFit { points, rank })
}

/// Fit a plane `z = a*x + b*y + c` through all values of the grid.
///
/// `x` is the column index and `y` is the row index of each value.
pub fn fit_plane(grid: &HeightGrid) -> Result<PlaneFit, GridError> {
    let n = grid.len();
    let mut design = DMatrix::<f64>::zeros(n, 3);
    let mut z = DVector::<f64>::zeros(n);

    for (y, row) in grid.rows().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            let i = y * grid.ncols() + x;
            design[(i, 0)] = x as f64;
            design[(i, 1)] = y as f64;
            design[(i, 2)] = 1.0;
            z[i] = value;
        }
    }

    let coeffs = least_squares(design, z)?;
    Ok(PlaneFit {
        a: coeffs[0],
        b: coeffs[1],
        c: coeffs[2],
    })
}

/// Fit a line `z = m*x + q` through a single scan line, `x` being the index of the value.
pub fn fit_line(row: &[f64]) -> Result<LineFit, GridError> {
    let n = row.len();
    let design = DMatrix::<f64>::from_fn(n, 2, |i, j| if j == 0 { i as f64 } else { 1.0 });
    let z = DVector::<f64>::from_column_slice(row);

    let coeffs = least_squares(design, z)?;
    Ok(LineFit {
        m: coeffs[0],
        q: coeffs[1],
    })
}

/// Arithmetic mean of the values.
#[inline(always)]
pub fn mean(values: &[f64]) -> f64 {
    statistical::mean(values)
}

/// Population standard deviation of the values (divisor `N`).
#[inline(always)]
pub fn std(values: &[f64]) -> f64 {
    statistical::population_standard_deviation(values, None)
}

/// Mean and population standard deviation of the values.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let mean = mean(values);
    (mean, statistical::population_standard_deviation(values, Some(mean)))
}

/// Mean of each row of the grid.
pub fn row_means(grid: &HeightGrid) -> Vec<f64> {
    grid.rows().map(mean).collect()
}

/// Population standard deviation of each row of the grid.
pub fn row_stds(grid: &HeightGrid) -> Vec<f64> {
    grid.rows().map(std).collect()
}

/// Distribute `values` into `n_bins` equal-width bins spanning `[min, max]`.
///
/// Bins are closed on the left and open on the right, except for the last bin
/// which also contains the maximal value. At least one bin is always used.
pub fn histogram(values: &[f64], n_bins: usize) -> Result<Histogram, GridError> {
    if values.is_empty() {
        return Err(GridError::EmptyGrid);
    }

    let n_bins = n_bins.max(1);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let step = (max - min) / n_bins as f64;
    let mut edges: Vec<f64> = (0..=n_bins).map(|i| min + i as f64 * step).collect();
    edges[n_bins] = max;

    let mut counts = vec![0usize; n_bins];
    for &value in values {
        // number of edges lower than or equal to the value; at least one since value >= min
        let above = edges.partition_point(|&edge| edge <= value);
        let bin = above.saturating_sub(1).min(n_bins - 1);
        counts[bin] += 1;
    }

    let centers = edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();

    Ok(Histogram { centers, counts })
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn plane(nrows: usize, ncols: usize) -> HeightGrid {
        HeightGrid::from_fn(nrows, ncols, |x, y| 2.5 * x as f64 + 3.2 * y as f64 + 5.0).unwrap()
    }

    #[test]
    fn test_fit_plane_square() {
        let fit = fit_plane(&plane(10, 10)).unwrap();
        assert_abs_diff_eq!(fit.a, 2.5, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.b, 3.2, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.c, 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_fit_plane_rectangular() {
        let fit = fit_plane(&plane(4, 13)).unwrap();
        assert_abs_diff_eq!(fit.a, 2.5, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.b, 3.2, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.c, 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fit.evaluate(3.0, 2.0), 18.9, epsilon = 1e-10);
    }

    #[test]
    fn test_fit_plane_degenerate() {
        // a single scan line: all points share y = 0
        let grid = HeightGrid::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0]]).unwrap();
        match fit_plane(&grid) {
            Err(GridError::DegenerateFit { points, rank }) => {
                assert_eq!(points, 4);
                assert_eq!(rank, 2);
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        let grid = HeightGrid::from_rows(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            fit_plane(&grid),
            Err(GridError::DegenerateFit { points: 1, .. })
        ));
    }

    #[test]
    fn test_fit_line() {
        let row: Vec<f64> = (0..8).map(|x| -0.75 * x as f64 + 2.0).collect();
        let fit = fit_line(&row).unwrap();
        assert_abs_diff_eq!(fit.m, -0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.q, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_line_least_squares() {
        // best line through (0, 0), (1, 2), (2, 1) is z = 0.5x + 0.5
        let fit = fit_line(&[0.0, 2.0, 1.0]).unwrap();
        assert_abs_diff_eq!(fit.m, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.q, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_fit_line_degenerate() {
        assert!(matches!(
            fit_line(&[3.0]),
            Err(GridError::DegenerateFit { points: 1, rank: 1 })
        ));
    }

    #[test]
    fn test_mean_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values), 5.0);
        assert_relative_eq!(std(&values), 2.0);

        let (m, s) = mean_std(&values);
        assert_relative_eq!(m, 5.0);
        assert_relative_eq!(s, 2.0);
    }

    #[test]
    fn test_row_statistics() {
        let grid = HeightGrid::from_rows(vec![vec![1.0, 4.0], vec![-3.0, -1.0]]).unwrap();
        let means = row_means(&grid);
        assert_relative_eq!(means[0], 2.5);
        assert_relative_eq!(means[1], -2.0);

        let stds = row_stds(&grid);
        assert_relative_eq!(stds[0], 1.5);
        assert_relative_eq!(stds[1], 1.0);
    }

    #[test]
    fn test_histogram_edges() {
        let values = [-1.3, 0.5, 0.2, 4.5];
        let histogram = histogram(&values, DEFAULT_N_BINS).unwrap();
        let width = (4.5 - -1.3) / 100.0;

        assert_eq!(histogram.centers.len(), 100);
        assert_eq!(histogram.counts.len(), 100);
        assert_relative_eq!(histogram.centers[0], -1.3 + width / 2.0, epsilon = 1e-12);
        assert_relative_eq!(histogram.centers[99], 4.5 - width / 2.0, epsilon = 1e-12);
        assert_relative_eq!(histogram.bin_width(), width, epsilon = 1e-12);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn test_histogram_membership() {
        let values = [0.0, 0.353, 0.5, 1.0];
        let histogram = histogram(&values, DEFAULT_N_BINS).unwrap();

        assert_eq!(histogram.counts[0], 1);
        assert_eq!(histogram.counts[35], 1);
        assert_eq!(histogram.counts[50], 1);
        assert_eq!(histogram.counts[51], 0);
        assert_eq!(histogram.counts[99], 1);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn test_histogram_constant_values() {
        let histogram = histogram(&[3.0, 3.0, 3.0], 10).unwrap();
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.counts[9], 3);
        assert_relative_eq!(histogram.centers[0], 3.0);
    }

    #[test]
    fn test_histogram_empty() {
        assert_eq!(histogram(&[], 10), Err(GridError::EmptyGrid));
    }
}
