//! CLI command implementations.

pub(crate) mod fast_check;
pub(crate) mod idle;
