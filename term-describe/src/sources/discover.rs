//! Source discovery over files and directories.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{info, warn};

use crate::error::{DescribeError, Result};

/// Extensions the bundled loaders can read, lowercase.
const SUPPORTED_EXTENSIONS: [&str; 1] = ["csv"];

/// True when the path has a supported extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|e| DescribeError::load(path.display().to_string(), e.to_string()))
}

/// Expands input paths into a sorted, de-duplicated list of canonical source files.
///
/// Files are taken as given when their extension is supported; directories are
/// walked recursively. Missing paths and unsupported files are skipped with a
/// warning.
pub fn discover_sources<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut sources = BTreeSet::new();
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    for input in inputs {
        let input = input.as_ref();
        if input.is_file() {
            if is_supported(input) {
                sources.insert(canonical(input)?);
            } else {
                warn!(path = %input.display(), "Skipping unsupported file");
            }
            continue;
        }
        if !input.exists() {
            warn!(path = %input.display(), "Input path does not exist");
            continue;
        }

        let pattern = format!(
            "{}/**/*",
            Pattern::escape(&input.to_string_lossy())
        );
        for entry in glob_with(&pattern, options)? {
            let path = entry.map_err(|e| DescribeError::Io(io::Error::from(e)))?;
            if path.is_file() && is_supported(&path) {
                sources.insert(canonical(&path)?);
            }
        }
    }

    info!(count = sources.len(), "Discovered source file(s)");
    Ok(sources.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("a/b.csv")));
        assert!(is_supported(Path::new("a/b.CSV")));
        assert!(!is_supported(Path::new("a/b.txt")));
        assert!(!is_supported(Path::new("a/csv")));
    }

    #[test]
    fn test_discover_walks_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.csv"), "x\n1\n").unwrap();
        fs::write(nested.join("a.CSV"), "x\n1\n").unwrap();
        fs::write(dir.path().join("readme.md"), "hi").unwrap();

        let found = discover_sources(&[dir.path()]).unwrap();
        assert_eq!(found.len(), 2);
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
        assert!(found.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_discover_dedups_and_skips_missing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.csv");
        fs::write(&file, "x\n1\n").unwrap();

        let inputs = vec![
            file.clone(),
            dir.path().to_path_buf(),
            dir.path().join("missing"),
            dir.path().join("notes.txt"),
        ];
        let found = discover_sources(&inputs).unwrap();
        assert_eq!(found, vec![file.canonicalize().unwrap()]);
    }
}
