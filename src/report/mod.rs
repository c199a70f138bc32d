//! Report renderers for resolved packages.
//!
//! - [`json`] — the resolved list, the compressed form with shared license
//!   texts, and the per-expression summary.
//! - [`terminal`] — a table for reading results in a terminal.
//! - [`warnings`] — the warnings and errors printed to stderr after a report.

pub mod json;
pub mod terminal;
pub mod warnings;
