pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, InputConfig, OutputConfig};
pub use error::{OutOfRangeReason, Result, SdfError, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract, extract_table, short_name, Document, DocumentOutcome, Extraction,
    ExtractionProgress, ExtractionReport, Grid, MarkerTrigger, OutputManager, TableExtractor,
    TableKind, Trigger,
};
pub use scanner::{DocumentScanner, FileFilter};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A document paired with the table to pull out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub table: TableKind,
}

/// Main library interface for SdfTables functionality
pub struct SdfTables {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl SdfTables {
    /// Create an instance that stops cleanly on Ctrl+C
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let mut tables = Self::detached(config, output_mode, verbose, quiet);
        tables.shutdown = GracefulShutdown::new()?;
        Ok(tables)
    }

    /// Create an instance without installing a signal handler
    pub fn detached(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let progress_enabled = !quiet && output_mode == OutputMode::Human;

        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(progress_enabled),
            shutdown: GracefulShutdown::detached(),
        }
    }

    /// Create SdfTables instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Expand inputs into fission jobs, followed by the boundary job when a
    /// boundary document is given.
    pub fn plan<P: AsRef<Path>>(&self, inputs: &[P], boundaries: Option<&Path>) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        if !inputs.is_empty() {
            let scanner = DocumentScanner::new(&self.config.input)?;
            jobs.extend(scanner.collect_inputs(inputs)?.into_iter().map(|input| Job {
                input,
                table: TableKind::Fission,
            }));
        }

        if let Some(path) = boundaries {
            jobs.push(Job {
                input: path.to_path_buf(),
                table: TableKind::EnergyBoundaries,
            });
        }

        if jobs.is_empty() {
            return Err(SdfError::NoDocumentsFound {
                searched_extensions: self.config.input.extensions.clone(),
            });
        }

        self.check_unique_outputs(&jobs)?;
        Ok(jobs)
    }

    fn output_name(&self, job: &Job) -> Result<String> {
        match job.table {
            TableKind::Fission => extractor::short_name_for_path(&job.input),
            TableKind::EnergyBoundaries => Ok(self.config.output.boundary_file_name.clone()),
        }
    }

    /// Two jobs writing the same output name would silently shadow each other.
    /// Jobs with an unusable name are left for extraction to report.
    fn check_unique_outputs(&self, jobs: &[Job]) -> Result<()> {
        let mut claimed: HashMap<String, &Path> = HashMap::new();

        for job in jobs {
            let Ok(name) = self.output_name(job) else {
                continue;
            };

            if let Some(first) = claimed.insert(name.clone(), &job.input) {
                return Err(SdfError::DuplicateOutput {
                    name,
                    first: first.display().to_string(),
                    second: job.input.display().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Extract every table and write a report of what happened.
    ///
    /// A failed document does not stop the batch unless `fail_fast` is set;
    /// its error is recorded in the report instead.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P], boundaries: Option<&Path>) -> Result<ExtractionReport> {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        let jobs = self.plan(inputs, boundaries)?;
        self.output_formatter
            .info(&format!("Found {} document(s) to process", jobs.len()));

        let output_manager = OutputManager::new(self.config.output.directory.clone())?
            .with_force_overwrite(self.config.output.force_overwrite);

        self.output_formatter.start_operation("Extracting tables");
        let outcomes = self.process_jobs(&jobs, &output_manager)?;

        let report = ExtractionReport {
            outcomes,
            extraction_time: Utc::now(),
            duration: start_time.elapsed(),
            output_directory: output_manager.get_output_directory().to_path_buf(),
        };

        if self.config.output.generate_report {
            let path = output_manager.save_report(&report)?;
            self.output_formatter
                .debug(&format!("Report written to {}", path.display()));
        }

        tracing::info!(
            documents = report.outcomes.len(),
            records = report.total_records(),
            failed = report.failures().count(),
            "batch finished"
        );

        Ok(report)
    }

    #[cfg(not(feature = "parallel"))]
    fn process_jobs(&self, jobs: &[Job], output_manager: &OutputManager) -> Result<Vec<DocumentOutcome>> {
        let extractor = TableExtractor::new(output_manager);
        let boundary_name = &self.config.output.boundary_file_name;

        let pb = self.progress_manager.create_document_progress(jobs.len() as u64);
        let mut progress = ExtractionProgress::new(jobs.len());
        let mut outcomes = Vec::with_capacity(jobs.len());

        for job in jobs {
            self.shutdown.check_shutdown()?;

            let outcome = extractor.process(&job.input, job.table, boundary_name);
            progress.record(&outcome);
            ui::progress::update_document_progress(&pb, &progress);
            self.progress_manager
                .suspend(|| self.output_formatter.print_outcome(&outcome));

            let failed = !outcome.is_success();
            outcomes.push(outcome);

            if failed && self.config.input.fail_fast {
                break;
            }
        }

        ui::progress::finish_progress_with_summary(
            &pb,
            &format!(
                "Processed {} of {} document(s), {} failed",
                progress.documents_processed,
                progress.total_documents,
                progress.errors.len()
            ),
            progress.elapsed(),
        );

        Ok(outcomes)
    }

    /// Documents are independent, so they can be processed concurrently;
    /// outcomes are returned in job order.
    #[cfg(feature = "parallel")]
    fn process_jobs(&self, jobs: &[Job], output_manager: &OutputManager) -> Result<Vec<DocumentOutcome>> {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicBool, Ordering};

        let extractor = TableExtractor::new(output_manager);
        let boundary_name = &self.config.output.boundary_file_name;
        let fail_fast = self.config.input.fail_fast;
        let halted = AtomicBool::new(false);

        let pb = self.progress_manager.create_document_progress(jobs.len() as u64);
        let started = Instant::now();

        // Jobs already in flight when a failure halts the batch still finish.
        let outcomes: Vec<Option<DocumentOutcome>> = jobs
            .par_iter()
            .map(|job| {
                if !self.shutdown.is_running() || halted.load(Ordering::SeqCst) {
                    return None;
                }
                let outcome = extractor.process(&job.input, job.table, boundary_name);
                if fail_fast && !outcome.is_success() {
                    halted.store(true, Ordering::SeqCst);
                }
                pb.inc(1);
                Some(outcome)
            })
            .collect();

        self.shutdown.check_shutdown()?;

        let outcomes: Vec<DocumentOutcome> = outcomes.into_iter().flatten().collect();
        for outcome in &outcomes {
            self.output_formatter.print_outcome(outcome);
        }

        ui::progress::finish_progress_with_summary(
            &pb,
            &format!("Processed {} document(s)", outcomes.len()),
            started.elapsed(),
        );

        Ok(outcomes)
    }

    /// Print the input to output mapping without touching the filesystem.
    pub fn dry_run<P: AsRef<Path>>(&self, inputs: &[P], boundaries: Option<&Path>) -> Result<Vec<(Job, PathBuf)>> {
        let jobs = self.plan(inputs, boundaries)?;
        let directory = &self.config.output.directory;

        let mut planned = Vec::with_capacity(jobs.len());
        for job in jobs {
            let dest = directory.join(self.output_name(&job)?);
            self.output_formatter.info(&format!(
                "{} [{}] -> {}",
                job.input.display(),
                job.table,
                dest.display()
            ));
            planned.push((job, dest));
        }

        Ok(planned)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &SdfError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_sdf(dir: &Path, name: &str, marker: &str, offset: usize, last: &str) -> PathBuf {
        let mut lines = vec![marker.to_string()];
        lines.extend((1..offset).map(|_| "      0      0      0".to_string()));
        for r in 0..50 {
            lines.push(format!("{r}a {r}b {r}c {r}d {r}e"));
        }
        lines.push(last.to_string());
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn tables_in(output: &Path) -> SdfTables {
        let mut config = Config::default();
        config.output.directory = output.to_path_buf();
        SdfTables::detached(config, OutputMode::Plain, 0, true)
    }

    #[test]
    fn test_run_batch_with_boundaries() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let a = write_sdf(input_dir.path(), "HEU-MET-FAST-015-001-ce.sdf", "u-235 total fission", 4, "x y z");
        let b = write_sdf(input_dir.path(), "HEU-SOL-THERM-001-001-v8.0-252.sdf", "energy boundaries:", 1, "p q r s");

        let tables = tables_in(output_dir.path());
        let report = tables.run(&[a], Some(b.as_path())).unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.has_failures());
        assert_eq!(report.total_records(), 252 + 253);

        let fission = fs::read_to_string(output_dir.path().join("HMF-015-001")).unwrap();
        assert!(fission.ends_with("x\ny\n"));

        let bounds = fs::read_to_string(output_dir.path().join("scale_252group_boundaries")).unwrap();
        assert_eq!(bounds.lines().count(), 253);
        assert!(bounds.ends_with("p\nq\nr\n"));
    }

    #[test]
    fn test_failed_document_does_not_stop_batch() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let bad = input_dir.path().join("HEU-MET-FAST-001-001-x.sdf");
        fs::write(&bad, "u-235 fission\n      0      0\n1 2 3 4 5\n").unwrap();
        let good = write_sdf(input_dir.path(), "HEU-MET-FAST-002-001-x.sdf", "u-235 fission", 4, "1 2");

        let tables = tables_in(output_dir.path());
        let report = tables.run(&[bad, good], None).unwrap();

        assert!(report.has_failures());
        assert_eq!(report.failures().count(), 1);
        assert!(!output_dir.path().join("HMF-001-001").exists());
        assert!(output_dir.path().join("HMF-002-001").exists());
    }

    #[test]
    fn test_fail_fast_stops_batch() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let bad = input_dir.path().join("badly-named.sdf");
        fs::write(&bad, "").unwrap();
        let good = write_sdf(input_dir.path(), "HEU-MET-FAST-002-001-x.sdf", "u-235 fission", 4, "1 2");

        let mut config = Config::default();
        config.output.directory = output_dir.path().to_path_buf();
        config.input.fail_fast = true;
        let tables = SdfTables::detached(config, OutputMode::Plain, 0, true);

        let report = tables.run(&[bad, good], None).unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(!output_dir.path().join("HMF-002-001").exists());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_fail_fast_stops_parallel_batch() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let bad = input_dir.path().join("badly-named.sdf");
        fs::write(&bad, "").unwrap();
        let mut inputs = vec![bad];
        for case in 1..=8 {
            let name = format!("HEU-MET-FAST-0{case:02}-001-x.sdf");
            inputs.push(write_sdf(input_dir.path(), &name, "u-235 fission", 4, "1 2"));
        }

        let mut config = Config::default();
        config.output.directory = output_dir.path().to_path_buf();
        config.input.fail_fast = true;
        let tables = SdfTables::detached(config, OutputMode::Plain, 0, true);

        // A single worker visits jobs in order, so nothing starts after the failure.
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let report = pool.install(|| tables.run(&inputs, None)).unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.has_failures());
        assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_shared_output_name_is_rejected() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let v8 = write_sdf(input_dir.path(), "HEU-MET-FAST-015-001-ce_v8.0-clutch.sdf", "u-235 fission", 4, "1 2");
        let v7 = write_sdf(input_dir.path(), "HEU-MET-FAST-015-001-ce_v7.1.sdf", "u-235 fission", 4, "3 4");

        let tables = tables_in(output_dir.path());
        match tables.run(&[v8.clone(), v7.clone()], None) {
            Err(SdfError::DuplicateOutput { name, first, second }) => {
                assert_eq!(name, "HMF-015-001");
                assert_eq!(first, v8.display().to_string());
                assert_eq!(second, v7.display().to_string());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_bad_names_do_not_count_as_duplicates() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let a = input_dir.path().join("clutch-a.sdf");
        let b = input_dir.path().join("clutch-b.sdf");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();

        let jobs = tables_in(output_dir.path()).plan(&[a, b], None).unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn test_document_without_trigger_writes_empty_table() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let input = input_dir.path().join("LEU-COMP-THERM-008-002-x.sdf");
        fs::write(&input, "u-238 capture\nnothing here\n").unwrap();

        let report = tables_in(output_dir.path()).run(&[input], None).unwrap();
        assert!(report.outcomes[0].is_empty());
        assert_eq!(
            fs::read_to_string(output_dir.path().join("LCT-008-002")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let input_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        let a = write_sdf(input_dir.path(), "HEU-MET-FAST-015-001-ce.sdf", "u-235 fission", 4, "1 2");

        let tables = tables_in(output_dir.path());
        let planned = tables.dry_run(&[a], Some(Path::new("bounds.sdf"))).unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].1, output_dir.path().join("HMF-015-001"));
        assert_eq!(planned[1].0.table, TableKind::EnergyBoundaries);
        assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cancelled_run() {
        let output_dir = TempDir::new().unwrap();
        let tables = tables_in(output_dir.path());
        tables.request_shutdown();

        let result = tables.run(&[PathBuf::from("x.sdf")], None);
        assert!(matches!(result, Err(SdfError::Cancelled)));
    }

    #[test]
    fn test_nothing_to_do() {
        let output_dir = TempDir::new().unwrap();
        let tables = tables_in(output_dir.path());
        let inputs: [PathBuf; 0] = [];
        assert!(matches!(
            tables.plan(&inputs, None),
            Err(SdfError::NoDocumentsFound { .. })
        ));
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        SdfTables::generate_sample_config(&config_path).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
        assert!(content.contains("[output]"));
    }
}
