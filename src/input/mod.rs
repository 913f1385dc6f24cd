// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! This module contains structures and methods for specifying parameters of the analysis.

pub mod analysis;
pub mod settings;

pub use analysis::{Analysis, AnalysisBuilder, AnalysisBuilderError};
pub use settings::{DataAnalysis, DataAnalysisBuilder, ImageCorrection, ImageCorrectionBuilder};
