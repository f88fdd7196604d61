//! Store configuration: where the content tree lives under the content root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::loader::DataLoadError;

/// Locations of the two content roots, relative to the asset source root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Static game database (`database/` by default).
    pub database_dir: PathBuf,
    /// Player profiles (`user/profiles/` by default). Created on first run.
    pub profiles_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("database"),
            profiles_dir: PathBuf::from("user").join("profiles"),
        }
    }
}

impl StoreConfig {
    /// Parse a TOML configuration. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str, file: &Path) -> Result<Self, DataLoadError> {
        toml::from_str(content).map_err(|e| DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self, DataLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.database_dir, Path::new("database"));
        assert_eq!(config.profiles_dir, Path::new("user/profiles"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            StoreConfig::from_toml_str(r#"profiles_dir = "saves""#, Path::new("stockpile.toml"))
                .unwrap();
        assert_eq!(config.database_dir, Path::new("database"));
        assert_eq!(config.profiles_dir, Path::new("saves"));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let result = StoreConfig::from_toml_str("profiles_dir = [", Path::new("stockpile.toml"));
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockpile.toml");
        std::fs::write(&path, "database_dir = \"db\"\n").unwrap();
        let config = StoreConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.database_dir, Path::new("db"));

        let missing = StoreConfig::from_toml_file(&dir.path().join("none.toml"));
        assert!(matches!(missing, Err(DataLoadError::Io { .. })));
    }
}
