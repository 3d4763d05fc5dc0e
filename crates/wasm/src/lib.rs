//! WASM bindings for comunicado
//!
//! This crate provides JavaScript-friendly API for:
//! - Loading the page background (PNG, JPEG or PDF) and an optional footer font
//! - Previewing parsed report text (records and skipped lines)
//! - Generating the comunicado PDF
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { ComunicadoExporter } from 'comunicado-wasm';
//!
//! await init();
//!
//! const exporter = new ComunicadoExporter();
//! exporter.loadBackground(new Uint8Array(await poster.arrayBuffer()));
//!
//! const preview = exporter.parse('sp-capital', textarea.value);
//! console.log(preview.records.length, preview.diagnostics);
//!
//! const pdf = exporter.generate('sp-capital', textarea.value);
//! download(pdf, ComunicadoExporter.fileName('sp-capital'));
//! ```

use chrono::{DateTime, FixedOffset};
use report::ReportType;
use template::{export, parse_template, Background, ExportRequest, PageTemplate};
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn report_type(report: &str) -> Result<ReportType, JsValue> {
    report.parse().map_err(js_error)
}

/// Current local time, taken from the browser clock
#[cfg(target_arch = "wasm32")]
fn now() -> Option<DateTime<FixedOffset>> {
    let date = js_sys::Date::new_0();
    // Minutes behind UTC
    let offset = FixedOffset::west_opt(date.get_timezone_offset() as i32 * 60)?;
    DateTime::from_timestamp_millis(date.get_time() as i64).map(|utc| utc.with_timezone(&offset))
}

#[cfg(not(target_arch = "wasm32"))]
fn now() -> Option<DateTime<FixedOffset>> {
    Some(chrono::Local::now().fixed_offset())
}

/// Comunicado PDF exporter
///
/// Holds the background, font and page template between calls so the page
/// only uploads them once.
#[wasm_bindgen]
pub struct ComunicadoExporter {
    background: Option<Background>,
    font: Option<Vec<u8>>,
    template: PageTemplate,
}

#[wasm_bindgen]
impl ComunicadoExporter {
    /// Create an exporter with the default A4 page template
    #[wasm_bindgen(constructor)]
    pub fn new() -> ComunicadoExporter {
        ComunicadoExporter {
            background: None,
            font: None,
            template: PageTemplate::default(),
        }
    }

    /// Load the page background
    ///
    /// @param data - PNG, JPEG or PDF bytes (Uint8Array)
    /// @returns Detected kind (e.g., "PNG image", "PDF")
    #[wasm_bindgen(js_name = loadBackground)]
    pub fn load_background(&mut self, data: &[u8]) -> Result<String, JsValue> {
        let background = Background::from_bytes(data.to_vec()).map_err(js_error)?;
        let kind = background.kind().to_string();
        self.background = Some(background);
        Ok(kind)
    }

    /// Whether a background has been loaded
    #[wasm_bindgen(js_name = hasBackground)]
    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Load a TrueType font for the footer
    ///
    /// @param data - TTF file bytes (Uint8Array)
    #[wasm_bindgen(js_name = loadFont)]
    pub fn load_font(&mut self, data: &[u8]) {
        self.font = Some(data.to_vec());
    }

    /// Go back to the standard Helvetica-Bold footer font
    #[wasm_bindgen(js_name = clearFont)]
    pub fn clear_font(&mut self) {
        self.font = None;
    }

    /// Replace the page template
    ///
    /// @param json - Page template JSON string
    #[wasm_bindgen(js_name = setTemplate)]
    pub fn set_template(&mut self, json: &str) -> Result<(), JsValue> {
        self.template = parse_template(json).map_err(js_error)?;
        Ok(())
    }

    /// Parse report text without rendering
    ///
    /// @param report - "br-interior" or "sp-capital"
    /// @param text - Pasted report text
    /// @returns { report, records, diagnostics }
    pub fn parse(&self, report: &str, text: &str) -> Result<JsValue, JsValue> {
        let parsed = ::report::parse(report_type(report)?, text);
        serde_wasm_bindgen::to_value(&parsed).map_err(Into::into)
    }

    /// Generate the comunicado PDF
    ///
    /// @param report - "br-interior" or "sp-capital"
    /// @param text - Pasted report text
    /// @returns PDF bytes (Uint8Array)
    pub fn generate(&self, report: &str, text: &str) -> Result<Vec<u8>, JsValue> {
        self.export_pdf(report_type(report)?, text, now())
            .map_err(js_error)
    }

    /// Conventional download name for a report's PDF
    ///
    /// @param report - "br-interior" or "sp-capital"
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(report: &str) -> Result<String, JsValue> {
        Ok(report_type(report)?.output_file_name().to_string())
    }
}

impl ComunicadoExporter {
    fn export_pdf(
        &self,
        report: ReportType,
        text: &str,
        creation_date: Option<DateTime<FixedOffset>>,
    ) -> template::Result<Vec<u8>> {
        let outcome = export(&ExportRequest {
            report,
            text,
            background: self.background.as_ref(),
            template: &self.template,
            font: self.font.as_deref(),
            creation_date,
        })?;
        Ok(outcome.pdf)
    }
}

impl Default for ComunicadoExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use template::TemplateError;
    use wasm_bindgen_test::*;

    /// 1x1 white PNG
    const PIXEL_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0xF8,
        0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0x33, 0x12, 0x95, 0x14, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[wasm_bindgen_test]
    fn test_export_without_background() {
        let exporter = ComunicadoExporter::new();
        assert!(!exporter.has_background());
        let result = exporter.export_pdf(ReportType::SpCapital, "CENTRO|1", None);
        assert!(matches!(result, Err(TemplateError::MissingBackground)));
    }

    #[wasm_bindgen_test]
    fn test_export_pdf() {
        let mut exporter = ComunicadoExporter::new();
        exporter.background = Some(Background::from_bytes(PIXEL_PNG.to_vec()).unwrap());

        let pdf = exporter
            .export_pdf(ReportType::SpCapital, "CENTRO|2", None)
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[wasm_bindgen_test]
    fn test_file_name() {
        assert_eq!(
            ComunicadoExporter::file_name("br-interior").ok().as_deref(),
            Some("comunicado_br_interior.pdf")
        );
    }
}
