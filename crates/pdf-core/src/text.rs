//! Text rendering utilities

use crate::document::Color;

/// Context for rendering one run of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "CmF1")
    pub font_resource: String,
    /// Font size in points
    pub font_size: f32,
    /// Fill color
    pub color: Color,
}

/// Generate PDF operators for a run of text
///
/// # Arguments
/// * `text_hex` - Text already encoded for the font (e.g., "<48656C6C6F>")
/// * `x` - Left edge of the run in points (PDF coordinates)
/// * `y` - Baseline in points (PDF coordinates, from bottom)
/// * `ctx` - Font and color for the run
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let Color { r, g, b } = ctx.color;
    format!(
        "BT\n{r} {g} {b} rg\n/{} {} Tf\n{x} {y} Td\n{text_hex} Tj\nET\n",
        ctx.font_resource, ctx.font_size
    )
    .into_bytes()
}
