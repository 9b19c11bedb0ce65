//! The HCF container format and integration headers.
//!
//! An HCF object bundles device images for one backend: a text node tree
//! describing the images, followed by a binary appendix holding their bytes.
//! The driver embeds each object into the host compilation through an
//! [`IntegrationHeader`].
//!
//! ## Modules
//!
//! - [`node`] — The attribute/child node tree and its text form
//! - [`generator`] — Binary attachment, serialization and hex escaping
//! - [`reader`] — Parsing serialized objects back
//! - [`header`] — Rendering and writing integration headers

pub mod error;
pub mod generator;
pub mod header;
pub mod node;
pub mod reader;

pub use error::{HcfError, Result};
pub use generator::{hex_escape_bytes, BinaryAppendix, HcfGenerator, BINARY_APPENDIX_MARKER};
pub use header::IntegrationHeader;
pub use node::{HcfNode, HcfValue, BINARY_NODE_NAME};
pub use reader::HcfObject;
