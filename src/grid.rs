// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Contains the implementation of the `HeightGrid` structure and its methods.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::errors::{GridError, GridReadError};

/// Rectangular grid of surface heights obtained from an AFM scan.
///
/// Values are stored row-major. Each row is one fast-scan line.
/// Within a row, the `x` coordinate is the column index; the `y` coordinate is the row index.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl HeightGrid {
    /// Create a grid with `nrows` rows and `ncols` columns from row-major data.
    pub fn new(nrows: usize, ncols: usize, data: Vec<f64>) -> Result<Self, GridError> {
        if nrows == 0 || ncols == 0 {
            return Err(GridError::EmptyGrid);
        }

        if data.len() != nrows * ncols {
            return Err(GridError::ShapeMismatch {
                expected: nrows * ncols,
                found: data.len(),
            });
        }

        Ok(Self { nrows, ncols, data })
    }

    /// Create a grid from a list of rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let nrows = rows.len();
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(GridError::ShapeMismatch {
                    expected: ncols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Self::new(nrows, ncols, data)
    }

    /// Create a grid by evaluating `f(x, y)` at every cell (`x` = column, `y` = row).
    pub fn from_fn(
        nrows: usize,
        ncols: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self, GridError> {
        let mut data = Vec::with_capacity(nrows * ncols);
        for y in 0..nrows {
            for x in 0..ncols {
                data.push(f(x, y));
            }
        }

        Self::new(nrows, ncols, data)
    }

    /// Read a height grid from a plain-text file.
    ///
    /// Each non-empty line is one scan line. Values may be separated by whitespace,
    /// commas or semicolons. Lines starting with `#` are skipped.
    /// Every value is multiplied by `scaling`.
    pub fn from_file(path: impl AsRef<Path>, scaling: f64) -> Result<Self, GridReadError> {
        let file = File::open(path.as_ref())
            .map_err(|_| GridReadError::CouldNotOpen(Box::from(path.as_ref())))?;

        let mut rows = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|_| GridReadError::CouldNotReadLine(i + 1))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let row = trimmed
                .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
                .filter(|token| !token.is_empty())
                .map(|token| parse_value(token, i + 1, scaling))
                .collect::<Result<Vec<f64>, GridReadError>>()?;

            rows.push(row);
        }

        Self::from_rows(rows).map_err(GridReadError::InvalidGrid)
    }

    /// Write the grid as a whitespace-separated text matrix.
    pub fn write(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for row in self.rows() {
            let line = row
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(writer, "{}", line)?;
        }

        Ok(())
    }

    /// Number of rows (scan lines).
    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns (points per scan line).
    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Shape of the grid as `(nrows, ncols)`.
    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Total number of values in the grid.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` since an empty grid cannot be constructed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.ncols + col]
    }

    #[inline(always)]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.data[index * self.ncols..(index + 1) * self.ncols]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        &mut self.data[index * self.ncols..(index + 1) * self.ncols]
    }

    /// Iterate over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.ncols)
    }

    /// Iterate mutably over the rows of the grid.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.ncols)
    }

    /// All values of the grid, row-major.
    #[inline(always)]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn min(&self) -> f64 {
        self.data.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }
}

fn parse_value(token: &str, line: usize, scaling: f64) -> Result<f64, GridReadError> {
    let value = token
        .parse::<f64>()
        .map_err(|_| GridReadError::InvalidValue(line, token.to_owned()))?;

    let scaled = value * scaling;
    if !scaled.is_finite() {
        return Err(GridReadError::NonFinite(line, scaled));
    }

    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_rows() {
        let grid = HeightGrid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.len(), 6);
        assert_relative_eq!(grid.get(1, 0), 4.0);
        assert_eq!(grid.row(1), &[4.0, 5.0, 6.0]);
        assert_relative_eq!(grid.min(), 1.0);
        assert_relative_eq!(grid.max(), 6.0);
    }

    #[test]
    fn test_from_rows_ragged() {
        match HeightGrid::from_rows(vec![vec![1.0, 2.0], vec![3.0]]) {
            Err(GridError::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_new_empty() {
        assert_eq!(HeightGrid::new(0, 3, vec![]), Err(GridError::EmptyGrid));
        assert_eq!(
            HeightGrid::from_rows(vec![vec![], vec![]]),
            Err(GridError::EmptyGrid)
        );
    }

    #[test]
    fn test_new_wrong_length() {
        assert_eq!(
            HeightGrid::new(2, 2, vec![1.0, 2.0, 3.0]),
            Err(GridError::ShapeMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_from_fn_coordinates() {
        let grid = HeightGrid::from_fn(2, 3, |x, y| (10 * y + x) as f64).unwrap();
        assert_eq!(grid.values(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# scan").unwrap();
        writeln!(file, "1.0 2.0, 3.0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "4;5;6").unwrap();

        let grid = HeightGrid::from_file(file.path(), 2.0).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.values(), &[2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_from_file_invalid_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0").unwrap();
        writeln!(file, "3.0 abc").unwrap();

        match HeightGrid::from_file(file.path(), 1.0) {
            Err(GridReadError::InvalidValue(line, token)) => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_from_file_non_finite() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 NaN").unwrap();

        match HeightGrid::from_file(file.path(), 1.0) {
            Err(GridReadError::NonFinite(1, _)) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_from_file_overflow_after_scaling() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0 3.0").unwrap();
        writeln!(file, "1e300 1.0 2.0").unwrap();

        match HeightGrid::from_file(file.path(), 1e9) {
            Err(GridReadError::NonFinite(line, value)) => {
                assert_eq!(line, 2);
                assert!(value.is_infinite());
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        // the same value is valid without scaling
        let grid = HeightGrid::from_file(file.path(), 1.0).unwrap();
        assert_relative_eq!(grid.get(1, 0), 1e300);
    }

    #[test]
    fn test_from_file_missing() {
        match HeightGrid::from_file("this_file_does_not_exist.txt", 1.0) {
            Err(GridReadError::CouldNotOpen(_)) => (),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_write_read_back() {
        let grid = HeightGrid::from_rows(vec![vec![-1.5, 0.25], vec![3.0, 1e-3]]).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        grid.write(&mut file).unwrap();
        file.flush().unwrap();

        let read = HeightGrid::from_file(file.path(), 1.0).unwrap();
        assert_eq!(read, grid);
    }
}
