use crate::error::{Result, SdfError};
use crate::extractor::block::Extraction;
use crate::extractor::table::TableKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const REPORT_FILE_NAME: &str = "sdftables_report.json";

/// Outcome for one document in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub input: PathBuf,
    pub table: TableKind,
    pub output: Option<PathBuf>,
    pub triggers: usize,
    pub records: usize,
    pub error: Option<String>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.records == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub extraction_time: DateTime<Utc>,
    pub duration: Duration,
    pub output_directory: PathBuf,
}

impl ExtractionReport {
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn total_records(&self) -> usize {
        self.outcomes.iter().map(|o| o.records).sum()
    }
}

/// Writes extracted tables into the output directory.
///
/// Each table goes to a temporary file next to its destination and is only
/// moved into place once every record has been written.
pub struct OutputManager {
    output_directory: PathBuf,
    force_overwrite: bool,
}

impl OutputManager {
    pub fn new(output_directory: PathBuf) -> Result<Self> {
        let manager = Self {
            output_directory,
            force_overwrite: false,
        };

        manager.validate_paths()?;
        Ok(manager)
    }

    pub fn with_force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn output_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        if name.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(SdfError::InvalidPath {
                path: format!("Output name must be a plain file name: {}", name),
            });
        }

        Ok(self.output_directory.join(relative))
    }

    /// Refuse to clobber an existing file unless forced.
    pub fn check_destination(&self, dest: &Path) -> Result<()> {
        if dest.exists() && !self.force_overwrite {
            return Err(SdfError::OutputExists {
                path: dest.display().to_string(),
            });
        }
        Ok(())
    }

    pub fn write_table(&self, name: &str, extraction: &Extraction<'_>) -> Result<PathBuf> {
        let dest = self.output_path(name)?;
        self.check_destination(&dest)?;

        let temp = NamedTempFile::new_in(&self.output_directory)?;
        let mut writer = BufWriter::new(temp);
        let bytes = extraction.write_records(&mut writer)?;

        let temp = writer.into_inner().map_err(|e| SdfError::Io(e.into_error()))?;
        self.persist(temp, &dest)?;

        tracing::debug!(path = %dest.display(), records = extraction.len(), bytes, "table written");
        Ok(dest)
    }

    /// The destination may have appeared since `check_destination`, so the
    /// final rename refuses to replace it unless forced.
    fn persist(&self, temp: NamedTempFile, dest: &Path) -> Result<()> {
        if self.force_overwrite {
            temp.persist(dest).map_err(|e| SdfError::Io(e.error))?;
            return Ok(());
        }

        temp.persist_noclobber(dest).map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => SdfError::OutputExists {
                path: dest.display().to_string(),
            },
            _ => SdfError::Io(e.error),
        })?;
        Ok(())
    }

    pub fn save_report(&self, report: &ExtractionReport) -> Result<PathBuf> {
        let report_path = self.output_directory.join(REPORT_FILE_NAME);
        let json_content =
            serde_json::to_string_pretty(report).map_err(|e| SdfError::Config {
                message: format!("Failed to serialize report to JSON: {}", e),
            })?;

        let mut file = fs::File::create(&report_path)?;
        file.write_all(json_content.as_bytes())?;
        writeln!(file)?;

        Ok(report_path)
    }

    fn validate_paths(&self) -> Result<()> {
        if !self.output_directory.exists() {
            fs::create_dir_all(&self.output_directory).map_err(|e| SdfError::InvalidPath {
                path: format!(
                    "Cannot create output directory {}: {}",
                    self.output_directory.display(),
                    e
                ),
            })?;
        }

        if !self.output_directory.is_dir() {
            return Err(SdfError::InvalidPath {
                path: format!("{} is not a directory", self.output_directory.display()),
            });
        }

        Ok(())
    }
}
