//! Page background: a raster image or the first page of a PDF

use crate::{Result, TemplateError};
use pdf_core::{detect_format, ImageFormat};
use std::fmt;
use std::path::Path;

/// What kind of file a background is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Image(ImageFormat),
    Pdf,
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundKind::Image(ImageFormat::Png) => f.write_str("PNG image"),
            BackgroundKind::Image(ImageFormat::Jpeg) => f.write_str("JPEG image"),
            BackgroundKind::Pdf => f.write_str("PDF"),
        }
    }
}

/// Background shared by every page of an export
#[derive(Clone, PartialEq, Eq)]
pub struct Background {
    kind: BackgroundKind,
    data: Vec<u8>,
}

impl Background {
    /// Wrap background bytes, detecting the kind from magic bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let kind = detect_kind(&data)?;
        Ok(Self { kind, data })
    }

    /// Read a background file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::from_bytes(data).map_err(|e| match e {
            TemplateError::InvalidBackground(msg) => {
                TemplateError::InvalidBackground(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn kind(&self) -> BackgroundKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Background")
            .field("kind", &self.kind)
            .field("len", &self.data.len())
            .finish()
    }
}

fn detect_kind(data: &[u8]) -> Result<BackgroundKind> {
    if data.is_empty() {
        return Err(TemplateError::InvalidBackground("file is empty".to_string()));
    }
    if data.starts_with(b"%PDF") {
        return Ok(BackgroundKind::Pdf);
    }
    detect_format(data)
        .map(BackgroundKind::Image)
        .map_err(|_| {
            TemplateError::InvalidBackground(
                "unsupported format (expected PNG, JPEG or PDF)".to_string(),
            )
        })
}
