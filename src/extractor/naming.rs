use crate::error::{Result, SdfError};
use std::path::Path;

/// Output name for the shared energy-boundary table.
pub const DEFAULT_BOUNDARY_OUTPUT: &str = "scale_252group_boundaries";

/// Derive the output name from a benchmark file name.
///
/// `HEU-MET-FAST-015-001-ce_v8.0-clutch.sdf` becomes `HMF-015-001`: the
/// initials of the first three dash-separated fields, then the case and
/// sub-case numbers.
pub fn short_name(file_name: &str) -> Result<String> {
    let parts: Vec<&str> = file_name.split('-').collect();
    let invalid = || SdfError::InvalidFileName {
        name: file_name.to_string(),
    };

    if parts.len() < 5 {
        return Err(invalid());
    }

    let mut name = String::new();
    for part in &parts[..3] {
        name.push(part.chars().next().ok_or_else(invalid)?);
    }

    if parts[3].is_empty() || parts[4].is_empty() {
        return Err(invalid());
    }

    name.push('-');
    name.push_str(parts[3]);
    name.push('-');
    name.push_str(parts[4]);

    Ok(name)
}

/// Same as [`short_name`], applied to the final component of `path`.
pub fn short_name_for_path(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SdfError::InvalidFileName {
            name: path.display().to_string(),
        })?;

    short_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_benchmark_names() {
        assert_eq!(
            short_name("HEU-MET-FAST-015-001-ce_v8.0-clutch.sdf").unwrap(),
            "HMF-015-001"
        );
        assert_eq!(
            short_name("HEU-SOL-THERM-001-001-v8.0-252.sdf").unwrap(),
            "HST-001-001"
        );
    }

    #[test]
    fn test_fifth_field_keeps_suffix_when_last() {
        assert_eq!(short_name("LEU-COMP-THERM-008-002.sdf").unwrap(), "LCT-008-002.sdf");
    }

    #[test]
    fn test_too_few_fields() {
        assert!(matches!(
            short_name("clutch.sdf"),
            Err(SdfError::InvalidFileName { .. })
        ));
        assert!(short_name("HEU-MET-FAST-015").is_err());
    }

    #[test]
    fn test_empty_fields() {
        assert!(short_name("HEU--FAST-015-001-x.sdf").is_err());
        assert!(short_name("HEU-MET-FAST--001-x.sdf").is_err());
    }

    #[test]
    fn test_directories_are_ignored() {
        let path = PathBuf::from("bench-data/v8-runs/HEU-MET-FAST-016-001-ce_v8.0-clutch.sdf");
        assert_eq!(short_name_for_path(&path).unwrap(), "HMF-016-001");
    }
}
