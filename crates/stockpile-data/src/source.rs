//! Asset source: the file-access boundary every aggregator reads through.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::loader::{DataLoadError, parse_document};

/// Read access to a tree of content documents.
///
/// All paths are relative to the source's root. Listings are returned sorted
/// by name so that builds are deterministic.
pub trait AssetSource {
    /// Read and decode one document.
    fn read_document(&self, path: &Path) -> Result<Value, DataLoadError>;

    /// Names of the immediate subdirectories of `path`.
    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, DataLoadError>;

    /// Names of the regular files directly inside `path`.
    fn list_files(&self, path: &Path) -> Result<Vec<String>, DataLoadError>;

    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<(), DataLoadError>;
}

/// An [`AssetSource`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn list_entries(&self, path: &Path, want_dirs: bool) -> Result<Vec<String>, DataLoadError> {
        let full = self.resolve(path);
        if !full.exists() {
            return Err(DataLoadError::NotFound { path: full });
        }

        let io_err = |source| DataLoadError::Io {
            path: full.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&full).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let is_dir = entry.file_type().map_err(io_err)?.is_dir();
            if is_dir == want_dirs {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl AssetSource for FsAssetSource {
    fn read_document(&self, path: &Path) -> Result<Value, DataLoadError> {
        let full = self.resolve(path);
        if !full.exists() {
            return Err(DataLoadError::NotFound { path: full });
        }
        let content = std::fs::read_to_string(&full).map_err(|source| DataLoadError::Io {
            path: full.clone(),
            source,
        })?;
        parse_document(&full, &content)
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, DataLoadError> {
        self.list_entries(path, true)
    }

    fn list_files(&self, path: &Path) -> Result<Vec<String>, DataLoadError> {
        self.list_entries(path, false)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), DataLoadError> {
        let full = self.resolve(path);
        std::fs::create_dir_all(&full).map_err(|source| DataLoadError::Io { path: full, source })
    }
}
