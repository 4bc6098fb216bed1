use crate::error::{Result, SdfError};
use crate::extractor::document::Document;
use crate::extractor::naming::short_name_for_path;
use crate::extractor::output_manager::{DocumentOutcome, OutputManager};
use crate::extractor::table::{extract_table, TableKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub documents_processed: usize,
    pub total_documents: usize,
    pub records_written: usize,
    pub current_document: Option<String>,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl ExtractionProgress {
    pub fn new(total_documents: usize) -> Self {
        Self {
            documents_processed: 0,
            total_documents,
            records_written: 0,
            current_document: None,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: &DocumentOutcome) {
        self.documents_processed += 1;
        self.records_written += outcome.records;
        self.current_document = Some(outcome.input.display().to_string());
        if let Some(ref error) = outcome.error {
            self.errors.push(format!("{}: {}", outcome.input.display(), error));
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Extracts one table from one document and writes it to disk.
pub struct TableExtractor<'a> {
    output: &'a OutputManager,
}

impl<'a> TableExtractor<'a> {
    pub fn new(output: &'a OutputManager) -> Self {
        Self { output }
    }

    /// Where the table for `input` would be written.
    pub fn planned_output(&self, input: &Path, kind: TableKind, boundary_name: &str) -> Result<PathBuf> {
        match kind {
            TableKind::Fission => self.output.output_path(&short_name_for_path(input)?),
            TableKind::EnergyBoundaries => self.output.output_path(boundary_name),
        }
    }

    /// Process a document, folding any failure into the outcome.
    pub fn process(&self, input: &Path, kind: TableKind, boundary_name: &str) -> DocumentOutcome {
        match self.try_process(input, kind, boundary_name) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(input = %input.display(), table = %kind, error = %err, "extraction failed");
                DocumentOutcome {
                    input: input.to_path_buf(),
                    table: kind,
                    output: None,
                    triggers: 0,
                    records: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub fn try_process(&self, input: &Path, kind: TableKind, boundary_name: &str) -> Result<DocumentOutcome> {
        // Resolve the name before reading so bad names fail fast.
        let dest = self.planned_output(input, kind, boundary_name)?;
        let name = dest
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SdfError::InvalidPath {
                path: dest.display().to_string(),
            })?
            .to_string();

        let document = Document::load(input)?;
        tracing::debug!(
            input = %input.display(),
            lines = document.line_count(),
            bytes = document.size(),
            "document loaded"
        );
        let extraction = extract_table(&document, kind)?;
        let written = self.output.write_table(&name, &extraction)?;

        Ok(DocumentOutcome {
            input: input.to_path_buf(),
            table: kind,
            output: Some(written),
            triggers: extraction.triggers.len(),
            records: extraction.len(),
            error: None,
        })
    }
}
