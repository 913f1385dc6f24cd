// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Assembly of the correction and analysis pipelines from the configuration.
//!
//! The stages are always resolved in the same order:
//! plane subtraction -> drift correction -> data shift -> height distribution -> roughness.
//! Drift correction requires the plane to be subtracted first: if plane subtraction
//! is disabled while drift correction is requested, it is inserted automatically
//! and a [`PipelineWarning`] is recorded.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use strum_macros::Display;

use crate::analysis::{self, RoughnessResult};
use crate::correction::{self, CorrectionRecord};
use crate::errors::{GridError, PipelineError};
use crate::grid::HeightGrid;
use crate::input::{DataAnalysis, ImageCorrection};
use crate::report::ReportSink;
use crate::stats::Histogram;

/// Construct an error for an unrecognized stage setting.
fn invalid_value(stage: &'static str, value: &str, accepted: &[&str]) -> PipelineError {
    let quoted: Vec<String> = accepted.iter().map(|x| format!("'{}'", x)).collect();
    let accepted = match quoted.split_last() {
        Some((last, [])) => last.to_owned(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    };

    PipelineError::InvalidConfigValue {
        stage,
        value: value.to_owned(),
        accepted,
    }
}

/// Setting of the plane subtraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PlaneSubtraction {
    Yes,
    No,
}

impl PlaneSubtraction {
    pub const STAGE: &'static str = "common_plane_subtraction";
}

impl FromStr for PlaneSubtraction {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" => Ok(Self::No),
            _ => Err(invalid_value(Self::STAGE, s, &["yes", "no"])),
        }
    }
}

/// Setting of the drift correction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DriftCorrection {
    Linear,
    Mean,
    No,
}

impl DriftCorrection {
    pub const STAGE: &'static str = "line_drift_correction";
}

impl FromStr for DriftCorrection {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "mean" => Ok(Self::Mean),
            "no" => Ok(Self::No),
            _ => Err(invalid_value(Self::STAGE, s, &["linear", "mean", "no"])),
        }
    }
}

/// Setting of the data shift stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum DataShift {
    Minimum,
    Mean,
    No,
}

impl DataShift {
    pub const STAGE: &'static str = "data_shift";
}

impl FromStr for DataShift {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimum" => Ok(Self::Minimum),
            "mean" => Ok(Self::Mean),
            "no" => Ok(Self::No),
            _ => Err(invalid_value(Self::STAGE, s, &["minimum", "mean", "no"])),
        }
    }
}

/// Setting of the height distribution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HeightDistribution {
    Yes,
    No,
}

impl HeightDistribution {
    pub const STAGE: &'static str = "height_values_distribution";
}

impl FromStr for HeightDistribution {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" => Ok(Self::No),
            _ => Err(invalid_value(Self::STAGE, s, &["yes", "no"])),
        }
    }
}

/// Setting of the roughness stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Roughness {
    #[strum(serialize = "1d")]
    OneD,
    #[strum(serialize = "2d")]
    TwoD,
    #[strum(serialize = "no")]
    No,
}

impl Roughness {
    pub const STAGE: &'static str = "roughness";
}

impl FromStr for Roughness {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" => Ok(Self::OneD),
            "2d" => Ok(Self::TwoD),
            "no" => Ok(Self::No),
            _ => Err(invalid_value(Self::STAGE, s, &["1d", "2d", "no"])),
        }
    }
}

/// Non-fatal adjustment made while assembling a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineWarning {
    /// Drift correction was requested without plane subtraction.
    PlaneSubtractionAdded,
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlaneSubtractionAdded => write!(
                f,
                "Drift correction requested without plane subtraction. Plane subtraction was added automatically to ensure correct results."
            ),
        }
    }
}

/// A single correction of the height data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionStep {
    PlaneSubtraction,
    LineDriftSubtraction,
    MeanDriftSubtraction,
    ShiftToMinimum,
    ShiftToMean,
}

impl CorrectionStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaneSubtraction => "common plane subtraction",
            Self::LineDriftSubtraction => "line drift subtraction",
            Self::MeanDriftSubtraction => "mean drift subtraction",
            Self::ShiftToMinimum => "shift to minimum",
            Self::ShiftToMean => "shift to mean",
        }
    }

    /// Apply the correction to the grid.
    pub fn apply(
        &self,
        grid: HeightGrid,
        sink: &mut dyn ReportSink,
    ) -> Result<(HeightGrid, CorrectionRecord), GridError> {
        Ok(match self {
            Self::PlaneSubtraction => {
                let (grid, fit) = correction::common_plane_subtraction(grid, sink)?;
                (grid, CorrectionRecord::PlaneSubtraction(fit))
            }
            Self::LineDriftSubtraction => {
                let (grid, drift) = correction::line_drift_subtraction(grid, sink)?;
                (grid, CorrectionRecord::LineDriftSubtraction(drift))
            }
            Self::MeanDriftSubtraction => {
                let (grid, drift) = correction::mean_drift_subtraction(grid, sink);
                (grid, CorrectionRecord::MeanDriftSubtraction(drift))
            }
            Self::ShiftToMinimum => {
                let (grid, shift) = correction::shift_to_minimum(grid);
                (grid, CorrectionRecord::ShiftToMinimum { shift })
            }
            Self::ShiftToMean => {
                let (grid, shift) = correction::shift_to_mean(grid);
                (grid, CorrectionRecord::ShiftToMean { shift })
            }
        })
    }
}

/// Ordered sequence of corrections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorrectionPipeline {
    steps: Vec<CorrectionStep>,
    warnings: Vec<PipelineWarning>,
}

impl CorrectionPipeline {
    /// Assemble the pipeline from the settings of the individual stages.
    pub fn from_stages(plane: PlaneSubtraction, drift: DriftCorrection, shift: DataShift) -> Self {
        let mut pipeline = Self::default();

        match plane {
            PlaneSubtraction::Yes => pipeline.steps.push(CorrectionStep::PlaneSubtraction),
            PlaneSubtraction::No => (),
        }

        let drift_step = match drift {
            DriftCorrection::Linear => Some(CorrectionStep::LineDriftSubtraction),
            DriftCorrection::Mean => Some(CorrectionStep::MeanDriftSubtraction),
            DriftCorrection::No => None,
        };

        if let Some(step) = drift_step {
            if plane == PlaneSubtraction::No {
                pipeline
                    .warnings
                    .push(PipelineWarning::PlaneSubtractionAdded);
                pipeline.steps.push(CorrectionStep::PlaneSubtraction);
            }
            pipeline.steps.push(step);
        }

        match shift {
            DataShift::Minimum => pipeline.steps.push(CorrectionStep::ShiftToMinimum),
            DataShift::Mean => pipeline.steps.push(CorrectionStep::ShiftToMean),
            DataShift::No => (),
        }

        pipeline
    }

    /// Assemble the pipeline from the configuration.
    /// All values are validated before the pipeline is constructed.
    pub fn from_config(config: &ImageCorrection) -> Result<Self, PipelineError> {
        let plane = config.common_plane_subtraction().parse::<PlaneSubtraction>()?;
        let drift = config.line_drift_correction().parse::<DriftCorrection>()?;
        let shift = config.data_shift().parse::<DataShift>()?;

        Ok(Self::from_stages(plane, drift, shift))
    }

    #[inline(always)]
    pub fn steps(&self) -> &[CorrectionStep] {
        &self.steps
    }

    #[inline(always)]
    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply all corrections in order. Returns the corrected grid
    /// and the parameters obtained by the individual corrections.
    pub fn apply(
        &self,
        mut grid: HeightGrid,
        sink: &mut dyn ReportSink,
    ) -> Result<(HeightGrid, Vec<CorrectionRecord>), GridError> {
        let mut records = Vec::with_capacity(self.steps.len());

        for step in self.steps.iter() {
            log::info!("Performing {}...", step.name());
            let (corrected, record) = step.apply(grid, sink)?;
            grid = corrected;
            records.push(record);
        }

        Ok((grid, records))
    }
}

/// A single analysis of the height data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStep {
    HeightDistribution,
    Roughness1D,
    Roughness2D,
}

impl AnalysisStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeightDistribution => "height values distribution",
            Self::Roughness1D => "1D roughness",
            Self::Roughness2D => "2D roughness",
        }
    }
}

/// Results of the data analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Histogram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<RoughnessResult>,
}

/// Ordered sequence of analyses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisPipeline {
    steps: Vec<AnalysisStep>,
}

impl AnalysisPipeline {
    /// Assemble the pipeline from the settings of the individual stages.
    pub fn from_stages(distribution: HeightDistribution, roughness: Roughness) -> Self {
        let mut steps = Vec::new();

        match distribution {
            HeightDistribution::Yes => steps.push(AnalysisStep::HeightDistribution),
            HeightDistribution::No => (),
        }

        match roughness {
            Roughness::OneD => steps.push(AnalysisStep::Roughness1D),
            Roughness::TwoD => steps.push(AnalysisStep::Roughness2D),
            Roughness::No => (),
        }

        Self { steps }
    }

    /// Assemble the pipeline from the configuration.
    /// All values are validated before the pipeline is constructed.
    pub fn from_config(config: &DataAnalysis) -> Result<Self, PipelineError> {
        let distribution = config
            .height_values_distribution()
            .parse::<HeightDistribution>()?;
        let roughness = config.roughness().parse::<Roughness>()?;

        Ok(Self::from_stages(distribution, roughness))
    }

    #[inline(always)]
    pub fn steps(&self) -> &[AnalysisStep] {
        &self.steps
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Perform all analyses in order. The grid is not modified.
    pub fn run(
        &self,
        grid: &HeightGrid,
        sink: &mut dyn ReportSink,
    ) -> Result<AnalysisResults, GridError> {
        let mut results = AnalysisResults::default();

        for step in self.steps.iter() {
            log::info!("Calculating {}...", step.name());
            match step {
                AnalysisStep::HeightDistribution => {
                    results.distribution = Some(analysis::height_distribution(grid)?)
                }
                AnalysisStep::Roughness1D => {
                    results.roughness = Some(analysis::roughness_1d(grid, sink))
                }
                AnalysisStep::Roughness2D => {
                    results.roughness = Some(analysis::roughness_2d(grid, sink))
                }
            }
        }

        Ok(results)
    }
}
