// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! # afm-analysis: Correction and analysis of AFM height data
//!
//! Crate for removing systematic errors from atomic force microscopy scans
//! and for calculating descriptive statistics of the corrected surface.
//!
//! The height data are corrected in a fixed order:
//! common plane subtraction, line drift correction and data shift.
//! The corrected data can then be analyzed by calculating the distribution of heights
//! and the roughness of the surface.
//!
//! ## Usage
//!
//! Run:
//!
//! ```bash
//! $ cargo add afm-analysis
//! ```
//!
//! Import the crate in your Rust code:
//!
//! ```rust
//! use afm_analysis::prelude::*;
//! ```
//!
//! `afm-analysis` is also available as a command line tool. You can install it using:
//! ```bash
//! $ cargo install afm-analysis
//! ```
//!
//! ## Examples
//!
//! Correcting a scan and calculating its roughness.
//! ```no_run
//! use afm_analysis::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // construct the analysis
//!     let analysis = Analysis::new()
//!             .input("scan.txt")                         // file with the height values
//!             .height_scaling(1e9)                       // convert meters to nanometers
//!             .image_correction(                         // corrections to perform
//!                 ImageCorrection::new()
//!                     .common_plane_subtraction("yes")   // remove the tilt of the sample
//!                     .line_drift_correction("linear")   // remove the drift of the scan lines
//!                     .data_shift("minimum")             // set the lowest point to zero
//!                     .build()?
//!             )
//!             .data_analysis(                            // analyses to perform
//!                 DataAnalysis::new()
//!                     .height_values_distribution("yes") // distribution of heights
//!                     .roughness("1d")                   // roughness of the individual scan lines
//!                     .build()?
//!             )
//!             .results("results.txt")                    // human-readable results
//!             .output_yaml("analysis.yaml")              // output yaml file
//!             .build()?;                                 // constructing the analysis
//!
//!     // activate colog if you want logging (requires the `colog` crate)
//!     colog::init();
//!
//!     // run the analysis and write the output
//!     let output = analysis.run()?;
//!     println!("Roughness: {:?}", output.results().roughness);
//!
//!     Ok(())
//! }
//! ```
//!
//! ***
//!
//! The individual corrections and analyses can also be used directly.
//!
//! ```no_run
//! use afm_analysis::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let grid = HeightGrid::from_file("scan.txt", 1.0)?;
//!
//!     let pipeline = CorrectionPipeline::from_stages(
//!         PlaneSubtraction::Yes,
//!         DriftCorrection::Mean,
//!         DataShift::No,
//!     );
//!     let (grid, _) = pipeline.apply(grid, &mut NullSink)?;
//!
//!     let roughness = roughness_2d(&grid, &mut NullSink);
//!     println!("Roughness: {}", roughness.roughness());
//!
//!     Ok(())
//! }
//! ```

/// Version of the `afm-analysis` crate.
pub const AFM_ANALYSIS_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod analysis;
pub mod correction;
pub mod errors;
pub mod grid;
pub mod input;
pub mod pipeline;
pub mod presentation;
pub mod report;
pub mod stats;

/// This module contains re-exported public structures of the `afm-analysis` crate.
pub mod prelude {
    pub use super::input::{
        Analysis, AnalysisBuilder, AnalysisBuilderError, DataAnalysis, DataAnalysisBuilder,
        ImageCorrection, ImageCorrectionBuilder,
    };

    pub use super::grid::HeightGrid;

    pub use super::correction::{
        common_plane_subtraction, line_drift_subtraction, mean_drift_subtraction,
        shift_to_mean, shift_to_minimum, CorrectionRecord, LineDriftStats, MeanDriftStats,
    };

    pub use super::analysis::{height_distribution, roughness_1d, roughness_2d, RoughnessResult};

    pub use super::pipeline::{
        AnalysisPipeline, AnalysisResults, AnalysisStep, CorrectionPipeline, CorrectionStep,
        DataShift, DriftCorrection, HeightDistribution, PipelineWarning, PlaneSubtraction,
        Roughness,
    };

    pub use super::presentation::AnalysisOutput;

    pub use super::report::{FileSink, MemorySink, NullSink, ReportSink};

    pub use super::stats::{Histogram, LineFit, PlaneFit};
}
