//! Target specification parsing and backend policy decisions for the
//! `acpp` compiler driver.
//!
//! The `targets` option names the backends an invocation compiles for.
//! This crate parses it, elaborates each backend into a concrete variant and
//! decides how the variants are combined:
//!
//! - [`backend`] — Backend, flavor and multipass enumerations
//! - [`spec`] — Parser for `targets` values
//! - [`legacy`] — Deriving `targets` from the deprecated `platform` option
//! - [`invocation`] — Backend variants and their compiler preferences
//! - [`policy`] — Multipass conflict resolution and host compiler selection

pub mod backend;
pub mod error;
pub mod invocation;
pub mod legacy;
pub mod policy;
pub mod spec;

pub use backend::{BackendKind, Flavor, MultipassMode};
pub use error::{Result, TargetError};
pub use invocation::{BackendInvocation, CompilerPreference};
pub use legacy::effective_targets;
pub use policy::{decide, BackendDecision};
pub use spec::{parse_targets, TargetSpec};
