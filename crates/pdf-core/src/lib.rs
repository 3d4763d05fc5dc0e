//! PDF Core - Low-level PDF composition
//!
//! This crate provides functionality for:
//! - Creating documents from scratch or opening existing PDFs
//! - Adding blank pages and duplicating pages
//! - Embedding TrueType fonts or using the standard Helvetica-Bold
//! - Inserting text at specific coordinates
//! - Inserting images (JPEG, PNG)
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PdfDocument, StandardFont};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_blank_page(595.28, 841.89)?;
//! doc.add_standard_font("footer", StandardFont::HelveticaBold)?;
//! doc.set_font("footer", 8.0)?;
//! doc.insert_text("FILIAL CENTRO - QTDE. 3", page, 297.64, 799.37, Align::Center)?;
//! std::fs::write("output.pdf", doc.to_bytes()?)?;
//! ```

mod document;
mod font;
mod image;
mod text;

pub use document::{Color, DocumentInfo, ImageHandle, PdfDocument, A4};
pub use font::{encode_winansi, FontData, StandardFont, WinAnsiText};
pub use image::{calculate_scaled_dimensions, detect_format, ImageFormat, ImageScaleMode};
pub use text::{generate_text_operators, TextRenderContext};

use std::io::Write;
use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Zlib-compress stream data for a FlateDecode filter
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
