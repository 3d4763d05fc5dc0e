//! End-to-end export: report text and background in, PDF bytes out

use crate::background::Background;
use crate::renderer::PageRenderer;
use crate::schema::PageTemplate;
use crate::{Result, TemplateError};
use chrono::{DateTime, FixedOffset};
use pdf_core::DocumentInfo;
use report::{expand, parse, Diagnostic, ReportType};

/// Inputs for one export
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub report: ReportType,
    /// Pasted report text
    pub text: &'a str,
    /// Background for every page; `None` fails with `MissingBackground`
    pub background: Option<&'a Background>,
    pub template: &'a PageTemplate,
    /// TrueType font bytes for the footer
    pub font: Option<&'a [u8]>,
    /// Written to the document info when set
    pub creation_date: Option<DateTime<FixedOffset>>,
}

/// A finished export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// Conventional file name for the report type
    pub file_name: &'static str,
    pub pdf: Vec<u8>,
    /// Number of valid records
    pub records: usize,
    /// Number of pages in `pdf`
    pub pages: u64,
    /// Lines skipped while parsing
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse, expand and render a report into a PDF
///
/// Inputs are checked before parsing: the background first, then the text.
/// A report without a single valid record is rejected before rendering.
pub fn export(request: &ExportRequest<'_>) -> Result<ExportOutcome> {
    let report = request.report;
    let background = request.background.ok_or(TemplateError::MissingBackground)?;
    if request.text.trim().is_empty() {
        return Err(TemplateError::MissingInput(report));
    }

    let parsed = parse(report, request.text);
    if parsed.is_empty() {
        return Err(TemplateError::NoValidRecords(report));
    }
    let pages = parsed.total_pages();
    log::info!(
        "{report}: {} record(s), {} skipped line(s), {pages} page(s)",
        parsed.records.len(),
        parsed.diagnostics.len()
    );
    let limit = request.template.max_pages;
    if pages > limit {
        return Err(TemplateError::TooManyPages {
            report,
            pages,
            limit,
        });
    }

    let directives = expand(&parsed.records, background);
    let mut renderer = PageRenderer::new(request.template);
    if let Some(font) = request.font {
        renderer = renderer.with_font(font);
    }
    let mut doc = renderer.render(&directives)?;

    doc.set_info(DocumentInfo {
        title: Some(format!("Comunicado {report}")),
        creator: Some(concat!("comunicado ", env!("CARGO_PKG_VERSION")).to_string()),
        producer: Some("comunicado".to_string()),
        creation_date: request.creation_date,
        ..DocumentInfo::default()
    });
    let pdf = doc.to_bytes()?;
    log::info!(
        "Generated {} ({} bytes)",
        report.output_file_name(),
        pdf.len()
    );

    Ok(ExportOutcome {
        file_name: report.output_file_name(),
        pdf,
        records: parsed.records.len(),
        pages,
        diagnostics: parsed.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        text: &'a str,
        background: Option<&'a Background>,
        template: &'a PageTemplate,
    ) -> ExportRequest<'a> {
        ExportRequest {
            report: ReportType::BrInterior,
            text,
            background,
            template,
            font: None,
            creation_date: None,
        }
    }

    #[test]
    fn test_missing_background_checked_first() {
        let template = PageTemplate::default();
        let result = export(&request("", None, &template));
        assert!(matches!(result, Err(TemplateError::MissingBackground)));
    }

    #[test]
    fn test_blank_text_is_missing_input() {
        let template = PageTemplate::default();
        let background = Background::from_bytes(b"%PDF-1.4".to_vec()).unwrap();
        let result = export(&request(" \r\n\t\n", Some(&background), &template));
        assert!(matches!(
            result,
            Err(TemplateError::MissingInput(ReportType::BrInterior))
        ));
    }

    #[test]
    fn test_page_limit_is_checked_before_rendering() {
        let template = PageTemplate {
            max_pages: 5,
            ..PageTemplate::default()
        };
        // Never opened: the limit fails first
        let background = Background::from_bytes(b"%PDF-1.4".to_vec()).unwrap();
        let result = export(&request("1|1|SANTOS|4\n2|2|BAURU|2", Some(&background), &template));
        assert!(matches!(
            result,
            Err(TemplateError::TooManyPages {
                report: ReportType::BrInterior,
                pages: 6,
                limit: 5,
            })
        ));
    }

    #[test]
    fn test_huge_quantity_is_rejected() {
        let template = PageTemplate::default();
        let background = Background::from_bytes(b"%PDF-1.4".to_vec()).unwrap();
        let result = export(&ExportRequest {
            report: ReportType::SpCapital,
            ..request("CENTRO|4000000000", Some(&background), &template)
        });
        assert!(matches!(
            result,
            Err(TemplateError::TooManyPages {
                pages: 4_000_000_000,
                ..
            })
        ));
    }

    #[test]
    fn test_no_valid_records() {
        let template = PageTemplate::default();
        let background = Background::from_bytes(b"%PDF-1.4".to_vec()).unwrap();
        let result = export(&request("22\tX\tREGISTRO\t10", Some(&background), &template));
        assert!(matches!(
            result,
            Err(TemplateError::NoValidRecords(ReportType::BrInterior))
        ));
    }
}
