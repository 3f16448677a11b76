//! Freight quote pricing engine.
//!
//! [`domain::recompute`] turns a quote form into cubage, a methodology
//! recommendation, both freight estimates and a viability verdict. The rest of
//! the crate is the plumbing around it: postal-code lookup, settings and draft
//! storage, and logging setup for the binary.

pub mod domain;
pub mod infra;
pub mod logging;
pub mod util;
