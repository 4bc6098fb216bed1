use std::fmt;
use thiserror::Error;

/// Why a requested grid cell could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutOfRangeReason {
    /// The row lies past the last line of the document.
    RowPastEnd { document_lines: usize },
    /// The row exists but has fewer tokens than the grid asks for.
    MissingTokens { needed: usize, found: usize },
}

impl fmt::Display for OutOfRangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfRangeReason::RowPastEnd { document_lines } => {
                write!(f, "row is past the end of the document ({} lines)", document_lines)
            }
            OutOfRangeReason::MissingTokens { needed, found } => {
                write!(f, "expected at least {} tokens, found {}", needed, found)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum SdfError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Out of range at line {line}: {reason}")]
    OutOfRange {
        line: usize,
        reason: OutOfRangeReason,
    },

    #[error("Cannot derive output name from file name: {name}")]
    InvalidFileName { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("No SDF documents found in the given inputs")]
    NoDocumentsFound { searched_extensions: Vec<String> },

    #[error("Output file already exists: {path}")]
    OutputExists { path: String },

    #[error("{first} and {second} both map to output {name}")]
    DuplicateOutput {
        name: String,
        first: String,
        second: String,
    },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SdfError {
    fn user_message(&self) -> String {
        match self {
            SdfError::OutOfRange { line, reason } => {
                format!("Table block is truncated near line {}: {}", line, reason)
            }
            SdfError::InvalidFileName { name } => {
                format!("File name does not follow the benchmark naming scheme: {}", name)
            }
            SdfError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SdfError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            SdfError::NoDocumentsFound { searched_extensions } => {
                format!(
                    "No input documents found with extensions: {}",
                    searched_extensions.join(", ")
                )
            }
            SdfError::OutputExists { path } => {
                format!("Output file already exists: {}", path)
            }
            SdfError::DuplicateOutput { name, first, second } => {
                format!("Inputs {} and {} would both be written to {}", first, second, name)
            }
            SdfError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SdfError::OutOfRange { .. } => Some(
                "Check that the file is a complete SDF file; the table following the marker line has fewer rows or values than expected.".to_string()
            ),
            SdfError::InvalidFileName { .. } => Some(
                "Input names must look like HEU-MET-FAST-015-001-<suffix>.sdf so the output name can be derived.".to_string()
            ),
            SdfError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            SdfError::NoDocumentsFound { .. } => Some(
                "Pass SDF files directly, or add the extension with --extensions.".to_string()
            ),
            SdfError::OutputExists { .. } => Some(
                "Remove the existing file, choose a different --output-dir, or use --force to overwrite.".to_string()
            ),
            SdfError::DuplicateOutput { .. } => Some(
                "Run the conflicting inputs in separate batches with different --output-dir values.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SdfError {
    fn from(error: toml::de::Error) -> Self {
        SdfError::Config {
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for SdfError {
    fn from(error: regex::Error) -> Self {
        SdfError::Config {
            message: format!("Invalid exclude pattern: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, SdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = SdfError::InvalidFileName {
            name: "clutch.sdf".to_string(),
        };
        assert!(error.user_message().contains("naming scheme"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_out_of_range_display() {
        let error = SdfError::OutOfRange {
            line: 12,
            reason: OutOfRangeReason::MissingTokens { needed: 5, found: 3 },
        };
        assert_eq!(
            error.to_string(),
            "Out of range at line 12: expected at least 5 tokens, found 3"
        );

        let error = SdfError::OutOfRange {
            line: 60,
            reason: OutOfRangeReason::RowPastEnd { document_lines: 59 },
        };
        assert!(error.to_string().contains("past the end"));
    }

    #[test]
    fn test_duplicate_output_names_both_inputs() {
        let error = SdfError::DuplicateOutput {
            name: "HMF-015-001".to_string(),
            first: "HEU-MET-FAST-015-001-ce_v8.0.sdf".to_string(),
            second: "HEU-MET-FAST-015-001-ce_v7.1.sdf".to_string(),
        };
        let message = error.user_message();
        assert!(message.contains("ce_v8.0"));
        assert!(message.contains("ce_v7.1"));
        assert!(!error.suggestion().unwrap().contains("Remove the existing file"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error = SdfError::from(toml_error);
        assert!(matches!(error, SdfError::Config { .. }));
    }
}
