use crate::error::{Result, SdfError};
use std::fs;
use std::path::Path;

/// An input file held fully in memory.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(SdfError::InvalidPath {
                path: format!("Not a readable file: {}", path.display()),
            });
        }

        let bytes = fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(path = %path.display(), "input is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        Ok(Self { text })
    }

    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    /// Lines without their terminators.
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }

    pub fn size(&self) -> u64 {
        self.text.len() as u64
    }
}
