//! Template JSON parsing

use crate::{PageTemplate, Result, TemplateError};
use std::path::{Path, PathBuf};

/// Parse a page template from JSON string
///
/// Missing fields take their defaults, so `{}` is a valid template.
pub fn parse_template(json: &str) -> Result<PageTemplate> {
    let template: PageTemplate =
        serde_json::from_str(json).map_err(|e| TemplateError::ParseError(e.to_string()))?;
    validate(&template)?;
    Ok(template)
}

/// Load a page template from a file
///
/// A relative footer font path is resolved against the template's directory.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<PageTemplate> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let mut template = parse_template(&json)?;

    if let Some(font) = template.footer.font.take() {
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        template.footer.font = Some(resolve_path(base_dir, &font).to_string_lossy().into_owned());
    }

    Ok(template)
}

/// Resolve `path` against `base_dir` unless it is already absolute
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn validate(template: &PageTemplate) -> Result<()> {
    let page = &template.page;
    if !(page.width > 0.0 && page.height > 0.0) {
        return Err(TemplateError::ParseError(format!(
            "page size must be positive, got {} x {}",
            page.width, page.height
        )));
    }

    let footer = &template.footer;
    if !(footer.font_size > 0.0) {
        return Err(TemplateError::ParseError(format!(
            "footer fontSize must be positive, got {}",
            footer.font_size
        )));
    }
    if !footer.bottom_margin.is_finite() {
        return Err(TemplateError::ParseError(
            "footer bottomMargin must be a finite number".to_string(),
        ));
    }

    if template.max_pages == 0 {
        return Err(TemplateError::ParseError(
            "maxPages must be at least 1".to_string(),
        ));
    }

    Ok(())
}
