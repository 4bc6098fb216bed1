use crate::config::InputConfig;
use crate::error::{Result, SdfError};
use crate::scanner::file_filter::FileFilter;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Expands command-line inputs into the list of documents to process.
pub struct DocumentScanner {
    filter: FileFilter,
    max_depth: usize,
}

impl DocumentScanner {
    pub fn new(config: &InputConfig) -> Result<Self> {
        Ok(Self {
            filter: FileFilter::new(config)?,
            max_depth: config.max_depth,
        })
    }

    /// Files are taken as given, in order. Directories are walked and their
    /// matching files appended in sorted order.
    pub fn collect_inputs<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();

        for input in inputs {
            let path = input.as_ref();

            if path.is_file() {
                documents.push(path.to_path_buf());
            } else if path.is_dir() {
                documents.extend(self.scan_directory(path)?);
            } else {
                return Err(SdfError::InvalidPath {
                    path: format!("Input does not exist: {}", path.display()),
                });
            }
        }

        if documents.is_empty() {
            return Err(SdfError::NoDocumentsFound {
                searched_extensions: self.filter.get_extensions().clone(),
            });
        }

        Ok(documents)
    }

    pub fn scan_directory(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();

        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_type().is_file() && self.filter.is_input_file(entry.path()) {
                documents.push(entry.into_path());
            }
        }

        documents.sort();
        tracing::debug!(root = %root.display(), found = documents.len(), "directory scanned");

        Ok(documents)
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        self.filter.should_traverse_directory(entry.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_directory_scan_is_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.sdf"));
        touch(&root.join("a.sdf"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested").join("c.sdf"));
        touch(&root.join(".cache").join("d.sdf"));
        touch(&root.join("e.sdf.bak"));

        let scanner = DocumentScanner::new(&InputConfig::default()).unwrap();
        let found = scanner.scan_directory(root).unwrap();

        assert_eq!(
            found,
            vec![
                root.join("a.sdf"),
                root.join("b.sdf"),
                root.join("nested").join("c.sdf"),
            ]
        );
    }

    #[test]
    fn test_explicit_files_keep_their_order() {
        let temp_dir = TempDir::new().unwrap();
        let z = temp_dir.path().join("z.sdf");
        let a = temp_dir.path().join("a.txt");
        touch(&z);
        touch(&a);

        let scanner = DocumentScanner::new(&InputConfig::default()).unwrap();
        let found = scanner.collect_inputs(&[z.clone(), a.clone()]).unwrap();
        assert_eq!(found, vec![z, a]);
    }

    #[test]
    fn test_missing_input() {
        let scanner = DocumentScanner::new(&InputConfig::default()).unwrap();
        let result = scanner.collect_inputs(&[PathBuf::from("/no/such/input.sdf")]);
        assert!(matches!(result, Err(SdfError::InvalidPath { .. })));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DocumentScanner::new(&InputConfig::default()).unwrap();
        let result = scanner.collect_inputs(&[temp_dir.path()]);
        assert!(matches!(result, Err(SdfError::NoDocumentsFound { .. })));
    }
}
