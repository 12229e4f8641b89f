//! Basic-data report model and its value parsers.

pub mod basic;
pub mod parser;

pub use basic::{BasicReport, ReportKey};
pub use parser::{GroupShare, Histogram, ParseError, format_histogram};
