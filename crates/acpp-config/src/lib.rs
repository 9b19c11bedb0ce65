//! Option registry and layered configuration resolution for the `acpp`
//! compiler driver.
//!
//! ## Modules
//!
//! - [`registry`] — The built-in catalog of driver options
//! - [`legacy`] — Upgrading hipSYCL / Open SYCL era spellings
//! - [`environment`] — Environment variable snapshots
//! - [`config_db`] — Defaults loaded from JSON config files
//! - [`resolver`] — Argument classification and source precedence
//! - [`invocation`] — Checks on the raw invocation (foreign flags, heuristics)

pub mod config_db;
pub mod environment;
pub mod error;
pub mod invocation;
pub mod legacy;
pub mod registry;
pub mod resolver;

// Re-export key types for convenience
pub use config_db::ConfigDb;
pub use environment::Environment;
pub use error::{ConfigError, Result};
pub use legacy::upgrade_legacy_name;
pub use registry::{DriverOption, OptionRegistry};
pub use resolver::{
    interpret_flag, ArgClass, ConfigResolver, OptionValue, Resolved, ResolvedConfig,
    ResolvedOption, ValueSource,
};
