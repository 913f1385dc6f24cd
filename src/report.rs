// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! This module contains the report sinks collecting human-readable diagnostics
//! produced by the correction and analysis steps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::WriteError;
use crate::presentation::{create_and_open_file, try_backup_file};

/// Line separating the individual diagnostic records.
pub(crate) const RECORD_SEPARATOR: &str = "----------------------------";

/// Destination for diagnostic records.
///
/// Writing into a sink never fails from the point of view of the caller.
pub trait ReportSink {
    /// Append `text` followed by a newline.
    fn write(&mut self, text: &str);

    /// Flush and release the underlying resource.
    fn close(&mut self);
}

/// Sink that discards everything written into it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    #[inline(always)]
    fn write(&mut self, _text: &str) {}

    #[inline(always)]
    fn close(&mut self) {}
}

/// Sink keeping the diagnostic records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Vec<String>,
}

impl MemorySink {
    /// All records written so far, each followed by a newline.
    pub fn text(&self) -> String {
        self.records.iter().map(|r| format!("{}\n", r)).collect()
    }

    /// Write all stored records into another sink.
    pub fn write_into(&self, sink: &mut dyn ReportSink) {
        for record in &self.records {
            sink.write(record);
        }
    }
}

impl ReportSink for MemorySink {
    fn write(&mut self, text: &str) {
        self.records.push(text.to_owned());
    }

    #[inline(always)]
    fn close(&mut self) {}
}

/// Sink writing diagnostic records into a text file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a new report file.
    /// An existing file is backed up unless `overwrite` is set.
    pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Self, WriteError> {
        try_backup_file(&path, overwrite, "results")?;
        let writer = create_and_open_file(&path)?;

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            writer: Some(writer),
        })
    }

    /// Path to the report file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop writing after a failure; the report is not needed for the analysis to proceed.
    fn disable(&mut self, error: std::io::Error) {
        log::warn!(
            "Could not write into the results file '{}' ({}). No more results will be written into it.",
            self.path.display(),
            error
        );
        self.writer = None;
    }
}

impl ReportSink for FileSink {
    fn write(&mut self, text: &str) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writeln!(writer, "{}", text) {
                self.disable(e);
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                self.disable(e);
            } else {
                log::info!("Results written into '{}'.", self.path.display());
            }
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_sink_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");

        let mut sink = FileSink::create(&path, false).unwrap();
        assert_eq!(sink.path(), path.as_path());
        sink.write("FIRST");
        sink.write("second\nrecord");
        sink.close();
        // closing twice is harmless
        sink.close();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "FIRST\nsecond\nrecord\n");
    }

    #[test]
    fn test_file_sink_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "old results").unwrap();

        let mut sink = FileSink::create(&path, false).unwrap();
        sink.write("new results");
        sink.close();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new results\n");
        // the original file has been backed up next to the new one
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_file_sink_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        std::fs::write(&path, "old results").unwrap();

        let mut sink = FileSink::create(&path, true).unwrap();
        sink.write("new results");
        drop(sink);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new results\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_sink_invalid_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_directory").join("results.txt");
        assert!(matches!(
            FileSink::create(&path, false),
            Err(WriteError::CouldNotCreateFile(_))
        ));
    }

    #[test]
    fn test_memory_sink_into_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");

        let mut memory = MemorySink::default();
        memory.write("FIRST");
        memory.write("second\nrecord");
        assert_eq!(memory.text(), "FIRST\nsecond\nrecord\n");

        let mut sink = FileSink::create(&path, false).unwrap();
        memory.write_into(&mut sink);
        sink.close();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), memory.text());
    }

    #[test]
    fn test_null_sink() {
        let mut sink = NullSink;
        sink.write("ignored");
        sink.close();
    }
}
