//! Record parsing and keyword normalization engine.
//!
//! The decision-bearing core of Jutsudex: sanitation passes over
//! HTML-bearing description text, keyword block extraction and
//! refinement, and the record parser that ties them together. Everything
//! here is a pure, synchronous transform; I/O lives in the adapters
//! around this crate.

pub mod keywords;
pub mod parser;
pub mod sanitize;

pub use parser::{ParseFailure, parse};
