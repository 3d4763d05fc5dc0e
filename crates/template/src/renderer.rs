//! Page directive rendering

use crate::background::{Background, BackgroundKind};
use crate::schema::PageTemplate;
use crate::{Result, TemplateError};
use pdf_core::{calculate_scaled_dimensions, ImageScaleMode, PdfDocument, PdfError, StandardFont};
use report::PageDirective;

/// Name the footer font is registered under
const FOOTER_FONT: &str = "footer";

/// Renders page directives into a PDF document
pub struct PageRenderer<'a> {
    /// Page size, background scaling and footer style
    template: &'a PageTemplate,
    /// TrueType font for the footer; Helvetica-Bold when absent
    font: Option<&'a [u8]>,
}

impl<'a> PageRenderer<'a> {
    /// Create a new renderer for a template
    pub fn new(template: &'a PageTemplate) -> Self {
        Self {
            template,
            font: None,
        }
    }

    /// Embed a TrueType font for the footer text
    pub fn with_font(mut self, ttf_data: &'a [u8]) -> Self {
        self.font = Some(ttf_data);
        self
    }

    /// Render one page per directive
    ///
    /// Every directive must point at the same background value; the first
    /// page is built from it once and then duplicated for the rest.
    pub fn render(&self, directives: &[PageDirective<'_, Background>]) -> Result<PdfDocument> {
        let first = directives
            .first()
            .ok_or_else(|| TemplateError::RenderError("no pages to render".to_string()))?;
        let background = first.background;
        if let Some(index) = directives
            .iter()
            .position(|d| !std::ptr::eq(d.background, background))
        {
            return Err(TemplateError::RenderError(format!(
                "page {} uses a different background than page 1",
                index + 1
            )));
        }

        let mut doc = self.background_page(background)?;
        self.load_font(&mut doc)?;

        for _ in 1..directives.len() {
            doc.duplicate_page(1)?;
        }

        let footer = &self.template.footer;
        for (index, directive) in directives.iter().enumerate() {
            let page = index + 1;
            let (width, height) = doc.page_size(page)?;
            let (x, y) = footer.anchor(width, height);
            doc.insert_text(&directive.footer_text, page, x, y, footer.align.into())?;
        }

        log::debug!(
            "Rendered {} page(s) over a {} background",
            directives.len(),
            background.kind()
        );
        Ok(doc)
    }

    /// Build a single-page document showing the background
    fn background_page(&self, background: &Background) -> Result<PdfDocument> {
        match background.kind() {
            BackgroundKind::Pdf => {
                let mut doc = PdfDocument::open_from_bytes(background.data())
                    .map_err(|e| TemplateError::InvalidBackground(e.to_string()))?;
                if doc.page_count() == 0 {
                    return Err(TemplateError::InvalidBackground(
                        "PDF has no pages".to_string(),
                    ));
                }
                doc.truncate_pages(1)?;

                // The footer is laid out on the unrotated page
                let rotation = doc.page_rotation(1)?;
                if rotation != 0 {
                    log::warn!(
                        "Background page is rotated by {rotation} degrees; the footer follows the unrotated page"
                    );
                }
                Ok(doc)
            }
            BackgroundKind::Image(_) => {
                let page = self.template.page;
                let mode = ImageScaleMode::from(self.template.background.scale);

                let mut doc = PdfDocument::new();
                doc.add_blank_page(page.width, page.height)?;
                let image = doc
                    .embed_image(background.data())
                    .map_err(|e| TemplateError::InvalidBackground(e.to_string()))?;

                // Fitted images are centred on the page
                let (width, height) = calculate_scaled_dimensions(
                    image.width(),
                    image.height(),
                    page.width,
                    page.height,
                    mode,
                );
                let x = (page.width - width) / 2.0;
                let y = (page.height - height) / 2.0;
                doc.draw_image(&image, 1, x, y, page.width, page.height, mode)?;
                Ok(doc)
            }
        }
    }

    fn load_font(&self, doc: &mut PdfDocument) -> Result<()> {
        match self.font {
            Some(data) => doc.add_font(FOOTER_FONT, data).map_err(|e| match e {
                PdfError::FontParseError(msg) => TemplateError::FontError(msg),
                other => other.into(),
            })?,
            None => doc.add_standard_font(FOOTER_FONT, StandardFont::HelveticaBold)?,
        }

        let footer = &self.template.footer;
        doc.set_font(FOOTER_FONT, footer.font_size)?;
        doc.set_text_color(footer.color.into());
        Ok(())
    }
}
