use crate::error::{Result, SdfError};
use crate::extractor::naming::DEFAULT_BOUNDARY_OUTPUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    /// Extensions picked up when an input is a directory.
    pub extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub boundary_file_name: String,
    pub generate_report: bool,
    pub force_overwrite: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["sdf".to_string()],
            exclude_patterns: vec![r".*\.bak$".to_string()],
            max_depth: 4,
            fail_fast: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            boundary_file_name: DEFAULT_BOUNDARY_OUTPUT.to_string(),
            generate_report: false,
            force_overwrite: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SdfError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SdfError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SdfError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["sdftables.toml", ".sdftables.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref extensions) = cli_args.extensions {
            self.input.extensions = extensions
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(ref name) = cli_args.boundary_file_name {
            self.output.boundary_file_name = name.clone();
        }

        if let Some(report) = cli_args.generate_report {
            self.output.generate_report = report;
        }

        if let Some(force) = cli_args.force_overwrite {
            self.output.force_overwrite = force;
        }

        if let Some(fail_fast) = cli_args.fail_fast {
            self.input.fail_fast = fail_fast;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.extensions.is_empty() {
            return Err(SdfError::Config {
                message: "At least one input extension must be specified".to_string(),
            });
        }

        if self.input.max_depth == 0 {
            return Err(SdfError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.input.exclude_patterns {
            regex::Regex::new(pattern)?;
        }

        let name = &self.output.boundary_file_name;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
            return Err(SdfError::Config {
                message: format!("Boundary file name must be a plain file name: {:?}", name),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let mut sample_config = Self::default();
        sample_config.output.directory = PathBuf::from(".");
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub boundary_file_name: Option<String>,
    pub generate_report: Option<bool>,
    pub force_overwrite: Option<bool>,
    pub fail_fast: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_boundary_file_name(mut self, name: Option<String>) -> Self {
        self.boundary_file_name = name;
        self
    }

    pub fn with_generate_report(mut self, report: Option<bool>) -> Self {
        self.generate_report = report;
        self
    }

    pub fn with_force_overwrite(mut self, force: Option<bool>) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: Option<bool>) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.extensions, vec!["sdf"]);
        assert_eq!(config.output.boundary_file_name, "scale_252group_boundaries");
        assert!(!config.input.fail_fast);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.input.extensions.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.input.exclude_patterns.push("(unclosed".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.boundary_file_name = "../bounds".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let sample = Config::create_sample_config().replace("max_depth = 4", "max_depth = 7");
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", sample).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.input.max_depth, 7);
        assert_eq!(loaded_config.output.directory, PathBuf::from("."));
        assert_eq!(loaded_config.input.extensions, vec!["sdf".to_string()]);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(SdfError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_extensions(Some(".SDF, txt".to_string()))
            .with_output_dir(Some(PathBuf::from("/tmp/tables")))
            .with_fail_fast(Some(true));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.input.extensions, vec!["sdf", "txt"]);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/tables"));
        assert!(config.input.fail_fast);
        assert!(!config.output.force_overwrite);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[input]"));
        assert!(sample.contains("[output]"));
        assert!(sample.contains("boundary_file_name"));
    }
}
