use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sdftables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract multigroup data tables from SDF benchmark files")]
#[command(
    long_about = "SdfTables reads SDF sensitivity files, locates the U-235 fission table in each \
                  one and writes its 252 values one per line to a file named after the benchmark \
                  case. The 253 energy-group boundaries can be extracted from a separate document."
)]
#[command(after_help = "EXAMPLES:\n  \
    sdftables HEU-MET-FAST-015-001-ce_v8.0-clutch.sdf\n  \
    sdftables runs/ --output-dir tables --force\n  \
    sdftables runs/*.sdf --boundaries HEU-SOL-THERM-001-001-v8.0-252.sdf\n  \
    sdftables --generate-config --config sdftables.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// SDF files or directories containing them
    #[arg(required_unless_present_any = ["generate_config", "boundaries"])]
    pub inputs: Vec<PathBuf>,

    /// Document to extract the energy-group boundaries from
    #[arg(short, long)]
    pub boundaries: Option<PathBuf>,

    /// File name for the boundary table
    #[arg(long, help = "Output file name for the boundary table")]
    pub boundary_name: Option<String>,

    /// Directory the tables are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Extensions picked up when scanning directories (comma-separated)
    #[arg(short, long)]
    pub extensions: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a JSON run report into the output directory
    #[arg(long)]
    pub report: bool,

    /// Stop at the first document that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,

    /// Show what would be extracted without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        // Flags only ever switch behaviour on; absence defers to the config file.
        let flag = |set: bool| set.then_some(true);

        CliOverrides::new()
            .with_extensions(self.extensions.clone())
            .with_output_dir(self.output_dir.clone())
            .with_boundary_file_name(self.boundary_name.clone())
            .with_generate_report(flag(self.report))
            .with_force_overwrite(flag(self.force))
            .with_fail_fast(flag(self.fail_fast))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
