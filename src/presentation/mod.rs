// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! This module contains structures and methods for presenting the results of the analysis.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use getset::Getters;
use serde::Serialize;

use crate::{
    correction::CorrectionRecord,
    errors::WriteError,
    grid::HeightGrid,
    pipeline::{AnalysisResults, PipelineWarning},
};

macro_rules! write_result {
    ($dst:expr, $($arg:tt)*) => {
        write!($dst, $($arg)*).map_err(|e| WriteError::CouldNotWriteResults(e))?
    };
}

/// Everything produced by a single run of the analysis.
#[derive(Debug, Clone, Getters)]
pub struct AnalysisOutput {
    /// The height grid after all corrections.
    #[getset(get = "pub")]
    grid: HeightGrid,
    /// Parameters of the performed corrections, in the order they were applied.
    #[getset(get = "pub")]
    corrections: Vec<CorrectionRecord>,
    /// Results of the data analysis.
    #[getset(get = "pub")]
    results: AnalysisResults,
    /// Adjustments made while assembling the correction pipeline.
    #[getset(get = "pub")]
    warnings: Vec<PipelineWarning>,
}

/// Serialized form of the output.
#[derive(Serialize)]
struct YamlSummary<'a> {
    shape: [usize; 2],
    corrections: &'a [CorrectionRecord],
    analysis: &'a AnalysisResults,
}

impl AnalysisOutput {
    pub(crate) fn new(
        grid: HeightGrid,
        corrections: Vec<CorrectionRecord>,
        results: AnalysisResults,
        warnings: Vec<PipelineWarning>,
    ) -> Self {
        Self {
            grid,
            corrections,
            results,
            warnings,
        }
    }

    /// Write parameters of the corrections and results of the analysis into a yaml file.
    pub fn write_yaml(
        &self,
        filename: impl AsRef<Path>,
        input: &str,
        overwrite: bool,
    ) -> Result<(), WriteError> {
        let writer = prepare_file(&filename, input, "yaml", overwrite)?;

        let summary = YamlSummary {
            shape: [self.grid.nrows(), self.grid.ncols()],
            corrections: &self.corrections,
            analysis: &self.results,
        };

        serde_yaml::to_writer(writer, &summary)
            .map_err(|_| WriteError::CouldNotWriteYaml(Box::from(filename.as_ref())))?;

        Ok(())
    }

    /// Write the height distribution as two columns: bin center and number of heights in the bin.
    ///
    /// Nothing is written if the distribution has not been calculated.
    pub fn write_distribution(
        &self,
        filename: impl AsRef<Path>,
        input: &str,
        overwrite: bool,
    ) -> Result<(), WriteError> {
        let Some(histogram) = &self.results.distribution else {
            log::warn!(
                "Height distribution has not been calculated. File '{}' will not be written.",
                filename.as_ref().display()
            );
            return Ok(());
        };

        let mut writer = prepare_file(&filename, input, "distribution", overwrite)?;
        write_result!(writer, "# center count\n");
        for (center, count) in histogram.centers.iter().zip(histogram.counts.iter()) {
            write_result!(writer, "{} {}\n", center, count);
        }

        writer.flush().map_err(WriteError::CouldNotWriteResults)
    }

    /// Write the corrected height grid, one scan line per line.
    pub fn write_grid(
        &self,
        filename: impl AsRef<Path>,
        input: &str,
        overwrite: bool,
    ) -> Result<(), WriteError> {
        let mut writer = prepare_file(&filename, input, "grid", overwrite)?;
        self.grid
            .write(&mut writer)
            .map_err(WriteError::CouldNotWriteResults)?;

        writer.flush().map_err(WriteError::CouldNotWriteResults)
    }
}

/// Back up a file, create a new one and write a header into it.
fn prepare_file(
    filename: &impl AsRef<Path>,
    input: &str,
    file_type: &str,
    overwrite: bool,
) -> Result<BufWriter<File>, WriteError> {
    try_backup_file(filename, overwrite, file_type)?;
    let mut writer = create_and_open_file(filename)?;
    write_header(&mut writer, input)?;

    Ok(writer)
}

/// Write header into an output file.
#[inline(always)]
fn write_header(writer: &mut impl Write, input: &str) -> Result<(), WriteError> {
    write_result!(
        writer,
        "# Height data processed with 'afm-analysis v{}' using input file '{}'.\n",
        crate::AFM_ANALYSIS_VERSION,
        input
    );

    Ok(())
}

/// Create and open file for buffered writing.
#[inline(always)]
pub(crate) fn create_and_open_file(
    filename: &impl AsRef<Path>,
) -> Result<BufWriter<File>, WriteError> {
    let file = File::create(filename.as_ref())
        .map_err(|_| WriteError::CouldNotCreateFile(Box::from(filename.as_ref())))?;

    Ok(BufWriter::new(file))
}

/// Back up an output file, if it is necessary and if it is requested.
pub(crate) fn try_backup_file(
    filename: &impl AsRef<Path>,
    overwrite: bool,
    file_type: &str,
) -> Result<(), WriteError> {
    if filename.as_ref().exists() {
        if !overwrite {
            log::warn!(
                "Output {} file '{}' already exists. Backing it up.",
                file_type,
                filename.as_ref().display()
            );
            backitup::backup(filename.as_ref())
                .map_err(|_| WriteError::CouldNotBackupFile(Box::from(filename.as_ref())))?;
        } else {
            log::warn!(
                "Output {} file '{}' already exists. It will be overwritten as requested.",
                file_type,
                filename.as_ref().display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use tempfile::TempDir;

    use super::*;
    use crate::analysis::RoughnessResult;
    use crate::stats::histogram;

    fn output(distribution: bool) -> AnalysisOutput {
        let grid = HeightGrid::from_rows(vec![vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]]).unwrap();
        let results = AnalysisResults {
            distribution: distribution.then(|| histogram(grid.values(), 3).unwrap()),
            roughness: Some(RoughnessResult::TwoD { roughness: 0.5 }),
        };

        AnalysisOutput::new(
            grid,
            vec![CorrectionRecord::ShiftToMinimum { shift: 1.5 }],
            results,
            vec![],
        )
    }

    #[test]
    fn test_write_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.yaml");
        output(true).write_yaml(&path, "scan.txt", false).unwrap();

        let content = read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "# Height data processed with 'afm-analysis v{}' using input file 'scan.txt'.",
                crate::AFM_ANALYSIS_VERSION
            )
        );

        let value: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
        assert_eq!(value["shape"][0].as_u64(), Some(2));
        assert_eq!(value["shape"][1].as_u64(), Some(3));
        assert_eq!(
            value["corrections"][0]["correction"].as_str(),
            Some("shift_to_minimum")
        );
        assert_eq!(value["corrections"][0]["shift"].as_f64(), Some(1.5));
        assert_eq!(value["analysis"]["roughness"]["method"].as_str(), Some("2d"));
        assert_eq!(value["analysis"]["roughness"]["roughness"].as_f64(), Some(0.5));
        assert_eq!(
            value["analysis"]["distribution"]["counts"]
                .as_sequence()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_write_distribution() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("distribution.dat");
        output(true)
            .write_distribution(&path, "scan.txt", false)
            .unwrap();

        let content = read_to_string(&path).unwrap();
        let data: Vec<(f64, usize)> = content
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(|line| {
                let mut split = line.split_whitespace();
                (
                    split.next().unwrap().parse().unwrap(),
                    split.next().unwrap().parse().unwrap(),
                )
            })
            .collect();

        assert_eq!(data.len(), 3);
        assert_eq!(data.iter().map(|(_, c)| c).sum::<usize>(), 6);
        approx::assert_relative_eq!(data[0].0, 0.5);
        approx::assert_relative_eq!(data[2].0, 2.5);
    }

    #[test]
    fn test_write_distribution_not_calculated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("distribution.dat");
        output(false)
            .write_distribution(&path, "scan.txt", false)
            .unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_write_grid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrected.txt");
        let output = output(false);
        output.write_grid(&path, "scan.txt", false).unwrap();

        let read = HeightGrid::from_file(&path, 1.0).unwrap();
        assert_eq!(&read, output.grid());
    }

    #[test]
    fn test_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrected.txt");
        std::fs::write(&path, "old content").unwrap();

        output(false).write_grid(&path, "scan.txt", false).unwrap();

        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path() != path)
            .collect::<Vec<_>>();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            read_to_string(backups[0].path()).unwrap(),
            "old content"
        );
        assert!(read_to_string(&path).unwrap().starts_with("# Height data"));
    }

    #[test]
    fn test_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrected.txt");
        std::fs::write(&path, "old content").unwrap();

        output(false).write_grid(&path, "scan.txt", true).unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(read_to_string(&path).unwrap().starts_with("# Height data"));
    }
}
