// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Contains the functions computing descriptive statistics of the corrected height data.
//! None of these functions modify the grid.

use serde::Serialize;

use crate::errors::GridError;
use crate::grid::HeightGrid;
use crate::report::{ReportSink, RECORD_SEPARATOR};
use crate::stats::{self, Histogram, DEFAULT_N_BINS};

/// Roughness of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "method")]
pub enum RoughnessResult {
    /// Mean of the roughness of the individual scan lines and its standard deviation.
    #[serde(rename = "1d")]
    OneD { roughness: f64, std: f64 },
    /// Standard deviation of all heights.
    #[serde(rename = "2d")]
    TwoD { roughness: f64 },
}

impl RoughnessResult {
    /// Value of the roughness.
    pub fn roughness(&self) -> f64 {
        match self {
            Self::OneD { roughness, .. } | Self::TwoD { roughness } => *roughness,
        }
    }

    /// Uncertainty of the roughness. Only available for 1D roughness.
    pub fn std(&self) -> Option<f64> {
        match self {
            Self::OneD { std, .. } => Some(*std),
            Self::TwoD { .. } => None,
        }
    }
}

/// Distribution of the heights in 100 equal-width bins spanning the range of the data.
pub fn height_distribution(grid: &HeightGrid) -> Result<Histogram, GridError> {
    stats::histogram(grid.values(), DEFAULT_N_BINS)
}

/// Roughness calculated for each scan line and averaged over all lines.
///
/// The standard deviation of the line roughnesses is reported as the uncertainty.
pub fn roughness_1d(grid: &HeightGrid, sink: &mut dyn ReportSink) -> RoughnessResult {
    let (roughness, std) = stats::mean_std(&stats::row_stds(grid));

    sink.write(&format!(
        "1D ROUGHNESS\nroughness = {} nm\nstandard deviation = {} nm\n{}\n",
        roughness, std, RECORD_SEPARATOR
    ));

    RoughnessResult::OneD { roughness, std }
}

/// Roughness calculated as the standard deviation of all heights of the grid.
pub fn roughness_2d(grid: &HeightGrid, sink: &mut dyn ReportSink) -> RoughnessResult {
    let roughness = stats::std(grid.values());

    sink.write(&format!(
        "2D ROUGHNESS\nroughness = {} nm\n{}\n",
        roughness, RECORD_SEPARATOR
    ));

    RoughnessResult::TwoD { roughness }
}
