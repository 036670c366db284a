//! Stable dataset identifiers.
//!
//! A dataset is one CSV file or one spreadsheet sheet. Its identifier is a pure
//! function of the canonical source path and the sheet name, so reruns over the
//! same inputs land in the same output locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const ID_LEN: usize = 12;

/// Maximum length of a slug used in output directory names.
const SLUG_MAX_LEN: usize = 60;

/// Identity of a dataset within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetIdentity {
    /// Truncated SHA-256 of `"<path>::sheet=<sheet>"`.
    pub id: String,
    /// Source path as given by the loader (expected to be canonical).
    pub source_path: PathBuf,
    /// File stem of the source.
    pub dataset_name: String,
    /// Sheet name for spreadsheet sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

impl DatasetIdentity {
    /// Derives the identity of `(path, sheet)`.
    ///
    /// The path is used verbatim; loaders canonicalise it before calling this.
    pub fn new(source_path: impl AsRef<Path>, sheet_name: Option<&str>) -> Self {
        let source_path = source_path.as_ref().to_path_buf();
        let dataset_name = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());

        Self {
            id: dataset_id(&source_path, sheet_name),
            source_path,
            dataset_name,
            sheet_name: sheet_name.map(str::to_string),
        }
    }

    /// Human readable title, e.g. `sales (sheet: Q1)`.
    pub fn title(&self) -> String {
        match &self.sheet_name {
            Some(sheet) => format!("{} (sheet: {sheet})", self.dataset_name),
            None => self.dataset_name.clone(),
        }
    }

    /// Directory name for per-dataset outputs: `<id>__<name>__<sheet>`.
    pub fn output_dir_name(&self) -> String {
        let sheet = self
            .sheet_name
            .as_deref()
            .map(slug)
            .unwrap_or_else(|| "sheet-None".to_string());
        format!("{}__{}__{}", self.id, slug(&self.dataset_name), sheet)
    }
}

/// Computes the identifier for a `(path, sheet)` pair.
pub fn dataset_id(source_path: &Path, sheet_name: Option<&str>) -> String {
    let key = format!(
        "{}::sheet={}",
        source_path.to_string_lossy(),
        sheet_name.unwrap_or("None")
    );
    let digest = Sha256::digest(key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(ID_LEN);
    id
}

/// Reduces a name to `[A-Za-z0-9_-]`, mapping whitespace to `_`.
pub fn slug(name: &str) -> String {
    let out: String = name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .take(SLUG_MAX_LEN)
        .collect();

    if out.is_empty() {
        "dataset".to_string()
    } else {
        out
    }
}
