//! Error types for target parsing and backend selection.

use acpp_config::ConfigError;

/// Errors that can occur while parsing targets or deciding backends.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// A malformed or unsupported `targets` value.
    #[error("invalid target specification '{spec}': {detail}")]
    InvalidTargetSpec { spec: String, detail: String },

    /// Two backends that cannot be combined.
    ///
    /// The policy engine resolves the only known conflict (CUDA + HIP) by
    /// forcing explicit multipass, so it never returns this.
    #[error("backends {first} and {second} cannot be combined")]
    UnsupportedBackendCombination { first: String, second: String },

    /// No backend preferred a host compiler and `cpu-compiler` is unset.
    #[error("no host compiler available: no backend provides one and {option} is not set")]
    NoHostCompiler { option: String },

    /// Error from the resolved configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
