//! Task implementations.

pub mod completions;

pub mod man;

/// Name the `svp` binary is installed under.
pub const BIN_NAME: &str = "svp";
