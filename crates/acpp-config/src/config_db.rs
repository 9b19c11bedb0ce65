//! Config-file database.
//!
//! Installations ship default settings as flat JSON objects in a config
//! directory (normally `/etc/AdaptiveCpp`):
//!
//! ```text
//! {
//!   "default-clang": "/opt/llvm/bin/clang++",
//!   "default-targets": "omp;generic"
//! }
//! ```
//!
//! All `*.json` files of every directory are merged. Files are read in
//! name order and later files override keys of earlier ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::{ConfigError, Result};

/// Directory searched when `config-file-dir` is not given.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/AdaptiveCpp";

/// A value as written in a config file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileValue {
    Text(String),
    Flag(bool),
    Number(Number),
    Other(Value),
}

/// Key/value defaults loaded from config files.
#[derive(Debug, Clone, Default)]
pub struct ConfigDb {
    config_file_dirs: Vec<PathBuf>,
    data: BTreeMap<String, String>,
}

impl ConfigDb {
    /// A database with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build directly from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            config_file_dirs: Vec::new(),
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Scan the given directories for `*.json` files and merge them.
    ///
    /// Directories that do not exist are skipped.
    pub fn load(config_file_dirs: &[PathBuf]) -> Result<Self> {
        let mut db = Self {
            config_file_dirs: config_file_dirs.to_vec(),
            data: BTreeMap::new(),
        };
        for dir in config_file_dirs {
            if !dir.is_dir() {
                log::debug!("config directory {} does not exist, skipping", dir.display());
                continue;
            }
            for file in json_files(dir)? {
                db.merge_file(&file)?;
            }
        }
        Ok(db)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, FileValue> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("loading {} key(s) from {}", entries.len(), path.display());
        for (key, value) in entries {
            let value = match value {
                FileValue::Text(s) => s,
                FileValue::Flag(b) => b.to_string(),
                FileValue::Number(n) => n.to_string(),
                FileValue::Other(other) => {
                    return Err(ConfigError::ConfigParseError {
                        detail: format!(
                            "{}: value of '{key}' must be a string, boolean or number, found {other}",
                            path.display()
                        ),
                    })
                }
            };
            self.data.insert(key, value);
        }
        Ok(())
    }

    /// Value of `key`, failing with [`ConfigError::MissingConfigKey`] if absent.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.lookup(key)
            .ok_or_else(|| ConfigError::MissingConfigKey { key: key.into() })
    }

    /// Value of `key`, or `default` if absent.
    pub fn get_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(default)
    }

    /// Value of `key`, if present.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// The directories this database was loaded from.
    pub fn config_file_dirs(&self) -> &[PathBuf] {
        &self.config_file_dirs
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no keys are defined.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_default() {
        let db = ConfigDb::from_pairs([("default-clang", "/opt/clang")]);
        assert_eq!(db.get("default-clang").unwrap(), "/opt/clang");
        assert_eq!(db.get_or_default("default-nvcxx", "nvc++"), "nvc++");
        assert!(matches!(
            db.get("default-nvcxx"),
            Err(ConfigError::MissingConfigKey { .. })
        ));
    }

    #[test]
    fn loads_and_merges_json_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a-base.json"),
            r#"{ "default-clang": "/usr/bin/clang", "default-targets": "omp" }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b-override.json"),
            r#"{ "default-targets": "generic", "default-is-dryrun": true, "default-jobs": 4 }"#,
        )
        .unwrap();
        // Non-.json file should be ignored
        std::fs::write(dir.path().join("notes.txt"), "not json").unwrap();

        let db = ConfigDb::load(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(db.len(), 4);
        assert_eq!(db.get("default-clang").unwrap(), "/usr/bin/clang");
        assert_eq!(db.get("default-targets").unwrap(), "generic");
        assert_eq!(db.get("default-is-dryrun").unwrap(), "true");
        assert_eq!(db.get("default-jobs").unwrap(), "4");
    }

    #[test]
    fn missing_directory_is_skipped() {
        let db = ConfigDb::load(&[PathBuf::from("/nonexistent/acpp/config")]).unwrap();
        assert!(db.is_empty());
        assert_eq!(db.config_file_dirs().len(), 1);
    }

    #[test]
    fn invalid_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let err = ConfigDb::load(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn nested_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nested.json"),
            r#"{ "default-targets": ["omp", "generic"] }"#,
        )
        .unwrap();
        let err = ConfigDb::load(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn top_level_must_be_object() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();
        let err = ConfigDb::load(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
