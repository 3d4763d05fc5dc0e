//! Report - pasted report text to page directives
//!
//! This crate provides:
//! - Report types (BR INTERIOR, SP CAPITAL) and their record shapes
//! - Record parsing from loosely delimited text (TAB, pipe, or space runs)
//! - Per-line diagnostics for skipped lines
//! - Page expansion (one directive per unit of quantity)
//!
//! # Example
//!
//! ```
//! use report::{expand, parse, ReportType};
//!
//! let parsed = parse(ReportType::SpCapital, "CENTRO|3");
//! let pages = expand(&parsed.records, &"poster.png");
//!
//! assert_eq!(pages.len(), 3);
//! assert_eq!(pages[0].footer_text, "FILIAL CENTRO - QTDE. 3");
//! ```

mod expander;
mod parser;
mod record;

pub use expander::{expand, pages, total_pages, PageDirective, Pages};
pub use parser::{parse, split_fields, Delimiter, Diagnostic, ParsedReport, SkipReason};
pub use record::{CapitalRecord, InteriorRecord, Record, ReportType};

use thiserror::Error;

/// Errors that can occur while handling report input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Unknown report type: {0} (expected br-interior or sp-capital)")]
    UnknownReportType(String),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
