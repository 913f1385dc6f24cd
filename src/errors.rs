// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! This module contains error types that can be returned by the `afm_analysis` crate.

use std::path::Path;

use colored::{ColoredString, Colorize};
use thiserror::Error;

fn path_to_yellow(path: &Path) -> ColoredString {
    path.to_string_lossy().into_owned().yellow()
}

/// Errors that can occur inside the application itself.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{} could not read the configuration file '{}'", "error:".red().bold(), .0.yellow())]
    CouldNotReadConfig(String),
}

/// Errors that can occur when constructing or processing a height grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("{} height grid is not rectangular (expected '{}' values, found '{}')", "error:".red().bold(), .expected.to_string().yellow(), .found.to_string().yellow())]
    ShapeMismatch { expected: usize, found: usize },

    #[error("{} height grid contains no values", "error:".red().bold())]
    EmptyGrid,

    #[error("{} could not perform least-squares fit on '{}' points (rank of the system is '{}')", "error:".red().bold(), .points.to_string().yellow(), .rank.to_string().yellow())]
    DegenerateFit { points: usize, rank: usize },
}

/// Errors that can occur when reading a height grid from a file.
#[derive(Error, Debug)]
pub enum GridReadError {
    #[error("{} could not open the height grid file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotOpen(Box<Path>),

    #[error("{} could not read line '{}' of the height grid file", "error:".red().bold(), .0.to_string().yellow())]
    CouldNotReadLine(usize),

    #[error("{} could not parse value '{}' on line '{}' of the height grid file", "error:".red().bold(), .1.yellow(), .0.to_string().yellow())]
    InvalidValue(usize, String),

    #[error("{} height grid contains a non-finite value '{}' on line '{}'", "error:".red().bold(), .1.to_string().yellow(), .0.to_string().yellow())]
    NonFinite(usize, f64),

    #[error("{}", .0)]
    InvalidGrid(GridError),
}

/// Errors that can occur when assembling the correction and analysis pipelines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{} invalid value '{}' for '{}' (use {}; the value is not case-sensitive)", "error:".red().bold(), .value.yellow(), .stage.yellow(), .accepted)]
    InvalidConfigValue {
        stage: &'static str,
        value: String,
        accepted: String,
    },
}

/// Errors that can occur when reading and validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} could not open the configuration file '{}'", "error:".red().bold(), .0.yellow())]
    CouldNotOpenConfig(String),

    #[error("{} could not understand the contents of the configuration file '{}' ({})", "error:".red().bold(), .0.yellow(), .1)]
    CouldNotParseConfig(String, serde_yaml::Error),

    #[error("{} height scaling factor must be finite and non-zero, not '{}'", "error:".red().bold(), .0.to_string().yellow())]
    InvalidScaling(f64),

    #[error("{}", .0)]
    InvalidPipeline(PipelineError),
}

/// Errors that can occur while writing the results.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{} could not create file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreateFile(Box<Path>),

    #[error("{} could not create a backup for file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotBackupFile(Box<Path>),

    #[error("{} could not write results ({})", "error:".red().bold(), .0)]
    CouldNotWriteResults(std::io::Error),

    #[error("{} could not write results in yaml format into '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotWriteYaml(Box<Path>),
}

/// Errors that can occur while running the full analysis.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{}", .0)]
    Config(#[from] ConfigError),

    #[error("{}", .0)]
    Read(#[from] GridReadError),

    #[error("{}", .0)]
    Grid(#[from] GridError),

    #[error("{}", .0)]
    Write(#[from] WriteError),
}
