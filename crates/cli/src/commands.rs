//! Subcommand implementations

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use report::ReportType;
use template::{export, load_template, Background, ExportRequest, PageTemplate};

/// Background used when `--background` is not given
pub const DEFAULT_BACKGROUND: &str = "poster.png";

#[derive(Debug)]
pub struct GenerateArgs {
    pub report: ReportType,
    pub input: PathBuf,
    pub background: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn generate(args: &GenerateArgs) -> Result<()> {
    let template = match &args.template {
        Some(path) => load_template(path)
            .with_context(|| format!("Failed to load template {}", path.display()))?,
        None => PageTemplate::default(),
    };

    let background = resolve_background(args.background.as_deref())?;
    let text = read_input(&args.input)?;

    let font_path = args
        .font
        .clone()
        .or_else(|| template.footer.font.as_ref().map(PathBuf::from));
    let font = match &font_path {
        Some(path) => Some(
            fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?,
        ),
        None => None,
    };

    let outcome = export(&ExportRequest {
        report: args.report,
        text: &text,
        background: background.as_ref(),
        template: &template,
        font: font.as_deref(),
        creation_date: Some(chrono::Local::now().fixed_offset()),
    })
    .with_context(|| format!("Failed to generate the {} comunicado", args.report))?;

    let output = output_path(args.output.as_deref(), outcome.file_name);
    fs::write(&output, &outcome.pdf)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    log::info!(
        "Wrote {} page(s) from {} record(s) to {}",
        outcome.pages,
        outcome.records,
        output.display()
    );
    if !outcome.diagnostics.is_empty() {
        log::warn!("{} line(s) were skipped", outcome.diagnostics.len());
    }
    Ok(())
}

pub fn parse(report: ReportType, input: &Path, json: bool) -> Result<()> {
    let text = read_input(input)?;
    let parsed = ::report::parse(report, &text);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &parsed)?;
        writeln!(out)?;
    } else {
        for record in &parsed.records {
            writeln!(out, "{}", record.footer_text())?;
        }
        log::info!(
            "{report}: {} record(s), {} page(s), {} skipped line(s)",
            parsed.records.len(),
            parsed.total_pages(),
            parsed.diagnostics.len()
        );
    }
    Ok(())
}

/// Read report text from a file, or stdin for `-`
pub fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read report text from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

/// Load the explicit background, or `poster.png` when it exists
///
/// `None` is returned when neither is available so the export reports a
/// missing background.
pub fn resolve_background(explicit: Option<&Path>) -> Result<Option<Background>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_BACKGROUND);
            if !fallback.is_file() {
                log::debug!("No background given and {DEFAULT_BACKGROUND} not found");
                return Ok(None);
            }
            log::info!("Using {DEFAULT_BACKGROUND} as background");
            fallback
        }
    };

    let background = Background::from_file(&path)
        .with_context(|| format!("Failed to load background {}", path.display()))?;
    log::debug!("Background {} is a {}", path.display(), background.kind());
    Ok(Some(background))
}

/// Where to write the PDF: an explicit file, a file inside an explicit
/// directory, or the default name in the working directory
pub fn output_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}
