//! Error types for configuration resolution.

use std::path::PathBuf;

/// Errors that can occur while resolving the driver configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The key does not name a registered option.
    #[error("unknown option '{key}'")]
    UnknownOption {
        /// The key that was looked up.
        key: String,
    },

    /// No source supplied a value and the option has no default.
    #[error("option '{key}' is not set (use {cli_flag}, {env_var} or the '{config_key}' config key)")]
    OptionNotSet {
        key: String,
        cli_flag: String,
        env_var: String,
        config_key: String,
    },

    /// A malformed environment entry, argument or config file value.
    #[error("config parse error: {detail}")]
    ConfigParseError { detail: String },

    /// A `get` on the config database for a key no config file defines.
    #[error("accessed missing key in config files: {key}")]
    MissingConfigKey { key: String },

    /// An argument belonging to a different SYCL implementation.
    #[error(
        "the {flag} flag is a component from a different SYCL implementation. \
         This flag is neither needed nor meaningful for AdaptiveCpp. Its use is unsupported."
    )]
    ForeignFlagRejected { flag: String },

    /// I/O error while scanning config directories.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file that is not valid JSON.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
