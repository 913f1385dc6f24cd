// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Contains the implementation of the main `Analysis` structure and its methods.

use std::fs::read_to_string;
use std::path::Path;

use derive_builder::Builder;
use getset::{CopyGetters, Getters, Setters};
use serde::Deserialize;

use crate::errors::{ConfigError, RunError};
use crate::grid::HeightGrid;
use crate::pipeline::{AnalysisPipeline, CorrectionPipeline};
use crate::presentation::AnalysisOutput;
use crate::report::{FileSink, MemorySink, ReportSink};

use super::{DataAnalysis, ImageCorrection};

/// Structure holding all the information necessary to correct and analyze an AFM scan.
#[derive(Debug, Clone, Builder, Getters, CopyGetters, Setters, Deserialize)]
#[serde(deny_unknown_fields)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Analysis {
    /// Path to a text file containing the height values of the scan.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    #[serde(alias = "input_file")]
    input: String,
    /// Factor multiplying all height values read from the input file.
    /// If not specified, the default value is 1.0.
    #[builder(default = "1.0")]
    #[serde(default = "default_scaling", alias = "height_scaling_factor")]
    #[getset(get_copy = "pub")]
    height_scaling: f64,
    /// Corrections to perform.
    /// If not specified, no correction is performed.
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    image_correction: ImageCorrection,
    /// Analyses to perform.
    /// If not specified, no analysis is performed.
    #[builder(default)]
    #[serde(default)]
    #[getset(get = "pub")]
    data_analysis: DataAnalysis,
    /// Path to a text file where the human-readable results will be written.
    /// If not specified, no such file is written.
    #[builder(setter(into, strip_option), default)]
    #[serde(default, alias = "results_file")]
    #[getset(get = "pub")]
    results: Option<String>,
    /// Path to an output YAML file where the parameters of the corrections and
    /// the results of the analysis will be written.
    #[builder(setter(into, strip_option), default)]
    #[serde(default, alias = "output")]
    #[getset(get = "pub")]
    output_yaml: Option<String>,
    /// Path to an output file where the height distribution will be written.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    #[getset(get = "pub")]
    output_distribution: Option<String>,
    /// Path to an output file where the corrected height grid will be written.
    #[builder(setter(into, strip_option), default)]
    #[serde(default)]
    #[getset(get = "pub")]
    output_grid: Option<String>,
    /// Be silent. Print nothing to the standard output during the analysis.
    #[builder(setter(custom), default = "false")]
    #[serde(default)]
    #[getset(get_copy = "pub", set = "pub")]
    silent: bool,
    /// Do not make backups. Overwrite all output files.
    #[builder(setter(custom), default = "false")]
    #[serde(default)]
    #[getset(get_copy = "pub", set = "pub")]
    overwrite: bool,
}

fn default_scaling() -> f64 {
    1.0
}

fn validate_scaling(scaling: f64) -> Result<(), ConfigError> {
    if !scaling.is_finite() || scaling == 0.0 {
        Err(ConfigError::InvalidScaling(scaling))
    } else {
        Ok(())
    }
}

fn validate_image_correction(config: &ImageCorrection) -> Result<CorrectionPipeline, ConfigError> {
    CorrectionPipeline::from_config(config).map_err(ConfigError::InvalidPipeline)
}

fn validate_data_analysis(config: &DataAnalysis) -> Result<AnalysisPipeline, ConfigError> {
    AnalysisPipeline::from_config(config).map_err(ConfigError::InvalidPipeline)
}

impl Analysis {
    pub fn new() -> AnalysisBuilder {
        AnalysisBuilder::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Analysis, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let string =
            read_to_string(&path).map_err(|_| ConfigError::CouldNotOpenConfig(path_str.clone()))?;
        let analysis: Analysis = serde_yaml::from_str(&string)
            .map_err(|e| ConfigError::CouldNotParseConfig(path_str, e))?;

        analysis.validate()?;
        Ok(analysis)
    }

    /// Check that the Analysis structure is valid. Used after deserialization from config yaml file.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_scaling(self.height_scaling)?;
        validate_image_correction(&self.image_correction)?;
        validate_data_analysis(&self.data_analysis)?;

        Ok(())
    }

    /// Request the human-readable results to be written into `path`.
    pub fn set_results(&mut self, path: impl Into<String>) {
        self.results = Some(path.into());
    }

    /// Log basic information about the analysis.
    fn info(&self) {
        log::info!("Will read height values from '{}'.", self.input);
        if self.height_scaling != 1.0 {
            log::info!("Height values will be scaled by '{}'.", self.height_scaling);
        }
        if let Some(results) = &self.results {
            log::info!("Will write results into '{}'.", results);
        }
    }

    /// Correct and analyze the height data, writing all requested output files.
    ///
    /// Both pipelines are assembled before the input file is read
    /// so that an invalid configuration is reported before any processing.
    /// No output file, including the results file, is touched unless all corrections
    /// and analyses succeed.
    pub fn run(&self) -> Result<AnalysisOutput, RunError> {
        let correction = validate_image_correction(&self.image_correction)?;
        let analysis = validate_data_analysis(&self.data_analysis)?;

        self.info();
        for warning in correction.warnings() {
            log::warn!("{}", warning);
        }

        let grid = HeightGrid::from_file(&self.input, self.height_scaling)?;
        log::info!(
            "Read height grid with {} scan lines of {} points.",
            grid.nrows(),
            grid.ncols()
        );

        let mut report = MemorySink::default();
        let (grid, corrections) = correction.apply(grid, &mut report)?;
        let results = analysis.run(&grid, &mut report)?;

        if let Some(path) = &self.results {
            log::info!("Writing the results into '{}'...", path);
            let mut sink = FileSink::create(path, self.overwrite)?;
            report.write_into(&mut sink);
            sink.close();
        }

        let output = AnalysisOutput::new(
            grid,
            corrections,
            results,
            correction.warnings().to_vec(),
        );

        if let Some(path) = &self.output_yaml {
            log::info!("Writing the summary into '{}'...", path);
            output.write_yaml(path, &self.input, self.overwrite)?;
        }

        if let Some(path) = &self.output_distribution {
            log::info!("Writing the height distribution into '{}'...", path);
            output.write_distribution(path, &self.input, self.overwrite)?;
        }

        if let Some(path) = &self.output_grid {
            log::info!("Writing the corrected height grid into '{}'...", path);
            output.write_grid(path, &self.input, self.overwrite)?;
        }

        Ok(output)
    }
}

impl AnalysisBuilder {
    /// Be silent. Print nothing to the standard output during the analysis.
    #[inline(always)]
    pub fn silent(&mut self) -> &mut Self {
        self.silent = Some(true);
        self
    }

    /// Do not make backups. Overwrite all output files.
    #[inline(always)]
    pub fn overwrite(&mut self) -> &mut Self {
        self.overwrite = Some(true);
        self
    }

    /// Validate the process of analysis building.
    fn validate(&self) -> Result<(), String> {
        if let Some(scaling) = self.height_scaling {
            validate_scaling(scaling).map_err(|e| e.to_string())?;
        }

        if let Some(correction) = &self.image_correction {
            validate_image_correction(correction).map_err(|e| e.to_string())?;
        }

        if let Some(analysis) = &self.data_analysis {
            validate_data_analysis(analysis).map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
