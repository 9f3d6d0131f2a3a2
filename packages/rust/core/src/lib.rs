//! Core pipeline orchestration for Jutsudex.
//!
//! Ties the engine and the store together into the end-to-end ingestion
//! pass, and derives library statistics from the result.

pub mod pipeline;
pub mod report;

pub use pipeline::{IngestReporter, IngestStats, SilentReporter, SkipReason, ingest_file, ingest_lines};
pub use report::LibraryReport;
