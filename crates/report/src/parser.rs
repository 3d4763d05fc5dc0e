//! Record parsing from pasted report text

use crate::record::{CapitalRecord, InteriorRecord, Record, ReportType};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Field delimiter detected for a single line
///
/// Detection order is fixed: TAB, then pipe, then runs of whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Pipe,
    /// Two or more consecutive whitespace characters
    SpaceRun,
}

impl Delimiter {
    /// Pick the delimiter for a line
    pub fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Delimiter::Tab
        } else if line.contains('|') {
            Delimiter::Pipe
        } else {
            Delimiter::SpaceRun
        }
    }
}

fn space_run() -> &'static Regex {
    static SPACE_RUN: OnceLock<Regex> = OnceLock::new();
    SPACE_RUN.get_or_init(|| Regex::new(r"\s{2,}").expect("space-run pattern is valid"))
}

/// Split a line into trimmed, non-empty fields
///
/// # Examples
/// ```
/// use report::split_fields;
///
/// assert_eq!(split_fields("22\t0\tREGISTRO\t10"), vec!["22", "0", "REGISTRO", "10"]);
/// assert_eq!(split_fields("CENTRO | 3"), vec!["CENTRO", "3"]);
/// assert_eq!(split_fields("5  1  SAO PAULO  2"), vec!["5", "1", "SAO PAULO", "2"]);
/// ```
pub fn split_fields(line: &str) -> Vec<&str> {
    let parts: Vec<&str> = match Delimiter::detect(line) {
        Delimiter::Tab => line.split('\t').collect(),
        Delimiter::Pipe => line.split('|').collect(),
        Delimiter::SpaceRun => space_run().split(line).collect(),
    };

    parts
        .into_iter()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}

/// Why a line was left out of the result
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SkipReason {
    #[error("expected at least {required} fields, found {found}")]
    TooFewFields { found: usize, required: usize },

    #[error("field '{field}' is not an integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}' is empty")]
    EmptyText { field: &'static str },

    #[error("quantity {value} is out of range")]
    QuantityOutOfRange { value: i64 },
}

/// A skipped line, reported for observability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Report being parsed
    pub report: ReportType,
    /// 1-based position among the non-blank input lines
    pub line: usize,
    /// Why the line was skipped
    pub reason: SkipReason,
    /// The normalized line content
    pub content: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {} skipped ({}): {}",
            self.report, self.line, self.reason, self.content
        )
    }
}

/// Result of parsing one block of report text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReport {
    pub report: ReportType,
    /// Valid records, in input order
    pub records: Vec<Record>,
    /// One entry per malformed line
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedReport {
    /// True when no line produced a record
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of pages the records expand to
    pub fn total_pages(&self) -> u64 {
        crate::total_pages(&self.records)
    }
}

/// Parse report text into validated records
///
/// Lines are normalized (carriage returns removed, trimmed) and blank lines
/// are ignored. Malformed lines are skipped with a [`Diagnostic`]; lines
/// whose quantity is zero or negative are skipped silently. Parsing never
/// fails as a whole: an empty [`ParsedReport`] is for the caller to reject.
pub fn parse(report: ReportType, text: &str) -> ParsedReport {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    let lines = text
        .split('\n')
        .map(|line| line.replace('\r', ""))
        .map(|line| line.trim_matches(is_blank).to_string())
        .filter(|line| !line.is_empty());

    for (index, line) in lines.enumerate() {
        let fields = split_fields(&line);
        if fields.is_empty() {
            continue;
        }

        match parse_fields(report, &fields) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(reason) => {
                let diagnostic = Diagnostic {
                    report,
                    line: index + 1,
                    reason,
                    content: line,
                };
                log::warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    ParsedReport {
        report,
        records,
        diagnostics,
    }
}

/// Whitespace, plus the byte order mark editors leave at the start of a file
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Validate the fields of one line
///
/// `Ok(None)` marks a well-formed line that carries no pages.
fn parse_fields(report: ReportType, fields: &[&str]) -> Result<Option<Record>, SkipReason> {
    let required = report.min_fields();
    if fields.len() < required {
        return Err(SkipReason::TooFewFields {
            found: fields.len(),
            required,
        });
    }

    match report {
        ReportType::BrInterior => {
            let linha = parse_int("linha", fields[0])?;
            let ramal = parse_int("ramal", fields[1])?;
            let cidade = require_text("cidade", fields[2])?;
            let Some(qtde) = parse_qtde(fields[3])? else {
                return Ok(None);
            };

            Ok(Some(Record::Interior(InteriorRecord {
                linha,
                ramal,
                cidade,
                qtde,
            })))
        }
        ReportType::SpCapital => {
            let filial = require_text("filial", fields[0])?;
            let Some(qtde) = parse_qtde(fields[1])? else {
                return Ok(None);
            };

            Ok(Some(Record::Capital(CapitalRecord { filial, qtde })))
        }
    }
}

/// Parse a locale-independent integer (optional sign, ASCII digits only)
fn parse_int(field: &'static str, value: &str) -> Result<i64, SkipReason> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| SkipReason::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Parse the quantity field; `None` for zero or negative quantities
fn parse_qtde(value: &str) -> Result<Option<u32>, SkipReason> {
    let qtde = parse_int("qtde", value)?;
    if qtde <= 0 {
        return Ok(None);
    }

    u32::try_from(qtde)
        .map(Some)
        .map_err(|_| SkipReason::QuantityOutOfRange { value: qtde })
}

fn require_text(field: &'static str, value: &str) -> Result<String, SkipReason> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SkipReason::EmptyText { field });
    }
    Ok(value.to_string())
}
