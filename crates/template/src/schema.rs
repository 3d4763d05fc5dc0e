//! Page template JSON schema types
//!
//! Every field is optional in JSON; missing fields take the defaults of the
//! printed comunicado (A4 portrait, stretched background, bold black footer
//! centred 15 mm above the bottom edge).

use pdf_core::{ImageScaleMode, A4};
use serde::{Deserialize, Serialize};

/// JSON Schema describing [`PageTemplate`]
pub const TEMPLATE_SCHEMA: &str = include_str!("../data/page-template.schema.json");

/// 15 mm in points
pub const DEFAULT_BOTTOM_MARGIN: f64 = 42.52;

pub const DEFAULT_FONT_SIZE: f32 = 8.0;

/// Largest document an export will build
pub const DEFAULT_MAX_PAGES: u64 = 10_000;

/// RGB Color for text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    /// Red component (0.0 - 1.0)
    #[serde(default)]
    pub r: f64,
    /// Green component (0.0 - 1.0)
    #[serde(default)]
    pub g: f64,
    /// Blue component (0.0 - 1.0)
    #[serde(default)]
    pub b: f64,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for pdf_core::Color {
    fn from(color: Color) -> Self {
        let channel = |v: f64| v.clamp(0.0, 1.0) as f32;
        pdf_core::Color::rgb(channel(color.r), channel(color.g), channel(color.b))
    }
}

/// Horizontal placement of the footer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl From<Align> for pdf_core::Align {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => pdf_core::Align::Left,
            Align::Center => pdf_core::Align::Center,
            Align::Right => pdf_core::Align::Right,
        }
    }
}

/// Page template: everything about the output page that is not report data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageTemplate {
    #[serde(default)]
    pub page: PageSize,

    #[serde(default)]
    pub background: BackgroundOptions,

    #[serde(default)]
    pub footer: FooterStyle,

    /// Exports needing more pages than this are rejected before rendering
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

fn default_max_pages() -> u64 {
    DEFAULT_MAX_PAGES
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            background: BackgroundOptions::default(),
            footer: FooterStyle::default(),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Page size in points, used for raster backgrounds
///
/// PDF backgrounds keep the size of their own first page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: A4.0,
            height: A4.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOptions {
    #[serde(default)]
    pub scale: ScaleMode,
}

/// How a raster background fills the page
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScaleMode {
    /// Cover the whole page, ignoring aspect ratio
    #[default]
    Stretch,
    FitWidth,
    FitHeight,
    /// Largest size that fits the page, aspect ratio kept
    FitBox,
}

impl From<ScaleMode> for ImageScaleMode {
    fn from(mode: ScaleMode) -> Self {
        match mode {
            ScaleMode::Stretch => ImageScaleMode::Stretch,
            ScaleMode::FitWidth => ImageScaleMode::FitWidth,
            ScaleMode::FitHeight => ImageScaleMode::FitHeight,
            ScaleMode::FitBox => ImageScaleMode::FitBox,
        }
    }
}

/// Footer text style and placement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FooterStyle {
    /// TTF file to embed; `None` uses the standard Helvetica-Bold
    #[serde(default)]
    pub font: Option<String>,

    #[serde(default = "default_font_size")]
    pub font_size: f32,

    #[serde(default)]
    pub color: Color,

    /// Baseline distance from the bottom edge, in points
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: f64,

    #[serde(default)]
    pub align: Align,
}

fn default_font_size() -> f32 {
    DEFAULT_FONT_SIZE
}

fn default_bottom_margin() -> f64 {
    DEFAULT_BOTTOM_MARGIN
}

impl Default for FooterStyle {
    fn default() -> Self {
        Self {
            font: None,
            font_size: DEFAULT_FONT_SIZE,
            color: Color::black(),
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
            align: Align::Center,
        }
    }
}

impl FooterStyle {
    /// Anchor point of the footer on a page, measured from the top-left
    ///
    /// Centred footers anchor at the page centre, left and right ones at the
    /// bottom margin from the respective edge.
    pub fn anchor(&self, page_width: f64, page_height: f64) -> (f64, f64) {
        let x = match self.align {
            Align::Left => self.bottom_margin,
            Align::Center => page_width / 2.0,
            Align::Right => page_width - self.bottom_margin,
        };
        (x, page_height - self.bottom_margin)
    }
}
