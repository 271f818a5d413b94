//! Result persistence: CSV tables, checkpoints, zip packaging.
//!
//! Table writes are best-effort by design: the batch's job is to produce a
//! complete in-memory result even when the disk is unavailable, so write
//! failures become a status string instead of an error. Zip packaging, by
//! contrast, is a deliberate hard failure surfaced to the operator.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::record::{BatchResult, ResultRecord};

/// Canonical output table name.
pub const RESULT_FILE: &str = "serp_summary.csv";

/// Name of the archive bundling the output files.
pub const ZIP_FILE: &str = "summary_files.zip";

/// Status returned when the table was written.
pub const SAVED_STATUS: &str = "Result file saved to disk.";

/// Status returned when the table write failed.
pub const NOT_SAVED_STATUS: &str = "Nothing was saved.";

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Capability of persisting a snapshot of the batch result.
///
/// `checkpoint` carries the search-request count for intermediate writes and
/// is `None` for the final canonical write. The returned string is a
/// human-readable status, not an error.
pub trait RecordSink: Send + Sync {
    fn write(&self, result: &BatchResult, checkpoint: Option<usize>) -> String;
}

/// CSV sink writing the five-column table into a project directory.
pub struct CsvSink {
    project_dir: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(project_dir: P) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    /// The file a write with the given checkpoint suffix targets.
    pub fn table_path(&self, checkpoint: Option<usize>) -> PathBuf {
        let name = match checkpoint {
            Some(count) => format!("serp_summary_{}.csv", count),
            None => RESULT_FILE.to_string(),
        };
        self.project_dir.join(name)
    }

    fn write_table(&self, result: &BatchResult, checkpoint: Option<usize>) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.project_dir)?;
        let mut writer = csv::Writer::from_path(self.table_path(checkpoint))?;
        for record in result.records() {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a previously written table back into records.
    pub fn read_table(&self, checkpoint: Option<usize>) -> Result<Vec<ResultRecord>, SinkError> {
        let mut reader = csv::Reader::from_path(self.table_path(checkpoint))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Bundle the named output files into one archive for download/email.
    ///
    /// Unlike table writes this propagates failure: a missing archive is an
    /// operator-visible problem.
    pub fn zip_results(&self, files: &[&str]) -> Result<PathBuf, SinkError> {
        let zip_path = self.project_dir.join(ZIP_FILE);
        let mut zip = ZipWriter::new(File::create(&zip_path)?);
        let options = SimpleFileOptions::default();

        for name in files {
            let mut content = Vec::new();
            File::open(self.project_dir.join(name))?.read_to_end(&mut content)?;
            zip.start_file(*name, options)?;
            zip.write_all(&content)?;
        }
        zip.finish()?;
        Ok(zip_path)
    }
}

impl RecordSink for CsvSink {
    fn write(&self, result: &BatchResult, checkpoint: Option<usize>) -> String {
        match self.write_table(result, checkpoint) {
            Ok(()) => SAVED_STATUS.to_string(),
            Err(_) => NOT_SAVED_STATUS.to_string(),
        }
    }
}

/// Read the query column (the first one) from an uploaded CSV file.
///
/// The first row is treated as a header and skipped; blank cells are
/// dropped.
pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut queries = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(query) = row.get(0) {
            let query = query.trim();
            if !query.is_empty() {
                queries.push(query.to_string());
            }
        }
    }
    Ok(queries)
}
