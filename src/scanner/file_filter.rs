use crate::config::InputConfig;
use crate::error::Result;
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &InputConfig) -> Result<Self> {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            exclude_patterns,
        })
    }

    pub fn is_input_file(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|s| s.to_str()) else {
            return false;
        };

        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        !self.is_excluded(path)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(&path_str))
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) else {
            return true;
        };

        // Hidden directories hold editor and VCS state, never inputs.
        if dir_name.starts_with('.') && dir_name != "." && dir_name != ".." {
            return false;
        }

        !self.is_excluded(path)
    }

    pub fn get_extensions(&self) -> &Vec<String> {
        &self.extensions
    }
}
