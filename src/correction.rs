// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Contains the functions correcting systematic errors of the AFM height data.
//!
//! Each function is stateless and can be called independently of the pipeline.
//! All functions preserve the shape of the grid.

use serde::Serialize;

use crate::errors::GridError;
use crate::grid::HeightGrid;
use crate::report::{ReportSink, RECORD_SEPARATOR};
use crate::stats::{self, PlaneFit};

/// Average coefficients of the lines fitted to the individual scan lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineDriftStats {
    pub m_mean: f64,
    pub m_std: f64,
    pub q_mean: f64,
    pub q_std: f64,
}

/// Average of the means of the individual scan lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanDriftStats {
    pub mean: f64,
    pub std: f64,
}

/// Parameters obtained while performing a single correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "correction", rename_all = "snake_case")]
pub enum CorrectionRecord {
    PlaneSubtraction(PlaneFit),
    LineDriftSubtraction(LineDriftStats),
    MeanDriftSubtraction(MeanDriftStats),
    ShiftToMinimum { shift: f64 },
    ShiftToMean { shift: f64 },
}

/// Subtract the best-fit plane `z = a*x + b*y + c` from the grid.
///
/// Removes the tilt caused by the positioning of the sample in the microscope.
/// The plane coefficients are written into the `sink`.
pub fn common_plane_subtraction(
    mut grid: HeightGrid,
    sink: &mut dyn ReportSink,
) -> Result<(HeightGrid, PlaneFit), GridError> {
    let fit = stats::fit_plane(&grid)?;

    for (y, row) in grid.rows_mut().enumerate() {
        for (x, value) in row.iter_mut().enumerate() {
            *value -= fit.evaluate(x as f64, y as f64);
        }
    }

    sink.write(&format!(
        "COMMON PLANE SUBTRACTION\nplane equation: z = a*x + b*y + c\na = {}\nb = {}\nc = {}\n{}\n",
        fit.a, fit.b, fit.c, RECORD_SEPARATOR
    ));

    Ok((grid, fit))
}

/// Subtract the best-fit line `z = m*x + q` from every scan line independently.
///
/// Removes drifts along the fast scan direction caused by temperature variations
/// or by friction between the tip and the sample.
/// Mean and standard deviation of the fitted coefficients are written into the `sink`.
pub fn line_drift_subtraction(
    mut grid: HeightGrid,
    sink: &mut dyn ReportSink,
) -> Result<(HeightGrid, LineDriftStats), GridError> {
    let mut slopes = Vec::with_capacity(grid.nrows());
    let mut offsets = Vec::with_capacity(grid.nrows());

    for row in grid.rows_mut() {
        let fit = stats::fit_line(row)?;
        for (x, value) in row.iter_mut().enumerate() {
            *value -= fit.evaluate(x as f64);
        }

        slopes.push(fit.m);
        offsets.push(fit.q);
    }

    let (m_mean, m_std) = stats::mean_std(&slopes);
    let (q_mean, q_std) = stats::mean_std(&offsets);
    let drift = LineDriftStats {
        m_mean,
        m_std,
        q_mean,
        q_std,
    };

    sink.write(&format!(
        "LINE DRIFT SUBTRACTION\nline equation: z = m*x + q\naverage m value = {}\nm values standard deviation = {}\naverage q value = {}\nq values standard deviation = {}\n{}\n",
        m_mean, m_std, q_mean, q_std, RECORD_SEPARATOR
    ));

    Ok((grid, drift))
}

/// Subtract its mean value from every scan line.
///
/// Mean and standard deviation of the line means are written into the `sink`.
pub fn mean_drift_subtraction(
    mut grid: HeightGrid,
    sink: &mut dyn ReportSink,
) -> (HeightGrid, MeanDriftStats) {
    let means = stats::row_means(&grid);

    for (row, mean) in grid.rows_mut().zip(&means) {
        row.iter_mut().for_each(|value| *value -= mean);
    }

    let (mean, std) = stats::mean_std(&means);

    sink.write(&format!(
        "MEAN DRIFT SUBTRACTION\naverage mean value = {}\nstandard deviation = {}\n{}\n",
        mean, std, RECORD_SEPARATOR
    ));

    (grid, MeanDriftStats { mean, std })
}

/// Shift the grid so that its minimal height is zero. Returns the subtracted value.
pub fn shift_to_minimum(grid: HeightGrid) -> (HeightGrid, f64) {
    let minimum = grid.min();
    (shift(grid, minimum), minimum)
}

/// Shift the grid so that its mean height is zero. Returns the subtracted value.
pub fn shift_to_mean(grid: HeightGrid) -> (HeightGrid, f64) {
    let mean = stats::mean(grid.values());
    (shift(grid, mean), mean)
}

#[inline]
fn shift(mut grid: HeightGrid, value: f64) -> HeightGrid {
    grid.values_mut().iter_mut().for_each(|z| *z -= value);
    grid
}
