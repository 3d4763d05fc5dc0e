//! Template - page template, rendering and export for comunicado
//!
//! This crate provides:
//! - The page template JSON schema (page size, background scaling, footer style)
//! - Background detection (raster image or single-page PDF)
//! - Rendering of page directives into a PDF document
//! - The end-to-end export workflow (text in, PDF bytes out)
//!
//! # Example
//!
//! ```ignore
//! use report::ReportType;
//! use template::{export, Background, ExportRequest, PageTemplate};
//!
//! let background = Background::from_bytes(std::fs::read("poster.png")?)?;
//! let template = PageTemplate::default();
//! let outcome = export(&ExportRequest {
//!     report: ReportType::SpCapital,
//!     text: "CENTRO|3",
//!     background: Some(&background),
//!     template: &template,
//!     font: None,
//!     creation_date: None,
//! })?;
//! std::fs::write(outcome.file_name, outcome.pdf)?;
//! ```

mod background;
mod export;
pub mod parser;
mod renderer;
mod schema;

pub use background::{Background, BackgroundKind};
pub use export::{export, ExportOutcome, ExportRequest};
pub use parser::{load_template, parse_template};
pub use renderer::PageRenderer;
pub use schema::*;

use report::ReportType;
use thiserror::Error;

/// Errors that can occur during template processing and export
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Missing background: supply an image or PDF to use as the page background")]
    MissingBackground,

    #[error("Missing input: paste the {0} report text")]
    MissingInput(ReportType),

    #[error("No valid records found in the {0} report")]
    NoValidRecords(ReportType),

    #[error("The {report} report needs {pages} pages, more than the limit of {limit}")]
    TooManyPages {
        report: ReportType,
        pages: u64,
        limit: u64,
    },

    #[error("Invalid background: {0}")]
    InvalidBackground(String),

    #[error("Failed to parse template: {0}")]
    ParseError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
