use clap::Parser;
use sdftables::{Cli, OutputFormatter, OutputMode, SdfError, SdfTables, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    let exit_code = run(&cli);
    process::exit(exit_code);
}

fn run(cli: &Cli) -> i32 {
    if cli.generate_config {
        return handle_generate_config(cli);
    }

    let tables = match SdfTables::from_cli(cli) {
        Ok(tables) => tables,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(cli, &tables);
    }

    match tables.run(&cli.inputs, cli.boundaries.as_deref()) {
        Ok(report) => {
            tables.output_formatter().print_extraction_report(&report);

            if report.has_failures() {
                2 // Completed, but some documents failed
            } else {
                0
            }
        }
        Err(e) => {
            tables.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &SdfError) -> i32 {
    match error {
        SdfError::Cancelled => 130,
        SdfError::OutOfRange { .. } => 3,
        SdfError::InvalidFileName { .. } => 4,
        SdfError::OutputExists { .. } | SdfError::DuplicateOutput { .. } => 5,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "sdftables.toml".to_string());

    match SdfTables::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  sdftables <inputs>... --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, tables: &SdfTables) -> i32 {
    let formatter = tables.output_formatter();

    formatter.start_operation("DRY RUN MODE - no files will be written");
    formatter.print_separator();

    match tables.dry_run(&cli.inputs, cli.boundaries.as_deref()) {
        Ok(planned) => {
            if formatter.mode() != OutputMode::Json {
                for (job, dest) in &planned {
                    println!("  {} [{}] -> {}", job.input.display(), job.table, dest.display());
                }
            }
            formatter.print_separator();
            formatter.success(&format!("{} table(s) would be written", planned.len()));
            0
        }
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &SdfError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "sdftables=warn",
        1 => "sdftables=info",
        _ => "sdftables=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Diagnostics go to stderr so extracted data and reports on stdout stay clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdftables::Config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::try_parse_from([
            "sdftables",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(handle_generate_config(&cli), 0);
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[input]"));
    }

    #[test]
    fn test_dry_run_with_bad_name() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("clutch.sdf");
        fs::write(&input, "").unwrap();

        let cli = Cli::try_parse_from(["sdftables", input.to_str().unwrap(), "--dry-run", "-q"]).unwrap();
        let tables = SdfTables::detached(Config::default(), OutputMode::Plain, 0, true);

        assert_eq!(handle_dry_run(&cli, &tables), 4);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&SdfError::Cancelled), 130);
        assert_eq!(
            exit_code_for(&SdfError::OutputExists { path: "x".to_string() }),
            5
        );
        assert_eq!(
            exit_code_for(&SdfError::Config { message: "x".to_string() }),
            1
        );
        assert_eq!(
            exit_code_for(&SdfError::DuplicateOutput {
                name: "HMF-015-001".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            }),
            5
        );
    }
}
