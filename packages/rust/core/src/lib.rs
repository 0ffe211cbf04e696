//! Pipeline orchestration for linkdex.
//!
//! This crate ties bookmark parsing, the dedup ledger, and the per-URL
//! worker into the end-to-end ingestion run and its report artifact.

pub mod pipeline;
pub mod report;

pub use pipeline::{ProgressReporter, SilentProgress, run};
pub use report::RunReport;
