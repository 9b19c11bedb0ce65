//! HCF error types.

use std::path::PathBuf;

/// Errors that can occur while writing or reading HCF data.
#[derive(Debug, thiserror::Error)]
pub enum HcfError {
    /// Writing an integration header failed.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The byte stream is not a well-formed HCF object.
    #[error("malformed HCF data: {detail}")]
    Malformed { detail: String },

    /// A `__binary` attachment points outside the binary appendix.
    #[error("binary attachment [{start}, {start}+{size}) exceeds appendix of {len} bytes")]
    AttachmentOutOfRange { start: u64, size: u64, len: usize },
}

/// Result type alias for HCF operations.
pub type Result<T> = std::result::Result<T, HcfError>;
