//! Process environment ingestion.

use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};

/// A snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw `KEY=VALUE` entries.
    ///
    /// Each entry is split on its first `=`, so values may themselves
    /// contain `=`. An entry without `=` is a [`ConfigError::ConfigParseError`].
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = BTreeMap::new();
        for entry in entries {
            let entry = entry.as_ref();
            let (key, value) =
                entry
                    .split_once('=')
                    .ok_or_else(|| ConfigError::ConfigParseError {
                        detail: format!("malformed environment entry '{entry}' (expected KEY=VALUE)"),
                    })?;
            vars.insert(key.to_string(), value.to_string());
        }
        Ok(Self { vars })
    }

    /// Build from already-split pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Iterate over all variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals() {
        let env = Environment::from_entries(["ACPP_CLANG=/usr/bin/clang", "OPTS=a=b"]).unwrap();
        assert_eq!(env.get("ACPP_CLANG"), Some("/usr/bin/clang"));
        assert_eq!(env.get("OPTS"), Some("a=b"));
    }

    #[test]
    fn empty_value_is_present() {
        let env = Environment::from_entries(["ACPP_DRYRUN="]).unwrap();
        assert_eq!(env.get("ACPP_DRYRUN"), Some(""));
    }

    #[test]
    fn entry_without_equals_is_rejected() {
        let err = Environment::from_entries(["PATH=/bin", "GARBAGE"]).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("GARBAGE"));
    }

    #[test]
    fn from_pairs_and_iter() {
        let env = Environment::from_pairs([("B", "2"), ("A", "1")]);
        let keys: Vec<_> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
