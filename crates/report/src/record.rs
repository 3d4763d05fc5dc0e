//! Report types and record shapes

use crate::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported report layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    /// `linha | ramal | cidade | qtde`
    BrInterior,
    /// `filial | qtde`
    SpCapital,
}

impl ReportType {
    /// Human-readable report name (e.g., "BR INTERIOR")
    pub fn display_name(self) -> &'static str {
        match self {
            ReportType::BrInterior => "BR INTERIOR",
            ReportType::SpCapital => "SP CAPITAL",
        }
    }

    /// Minimum number of fields a line must carry
    pub fn min_fields(self) -> usize {
        match self {
            ReportType::BrInterior => 4,
            ReportType::SpCapital => 2,
        }
    }

    /// Conventional output file name for an export of this report
    pub fn output_file_name(self) -> &'static str {
        match self {
            ReportType::BrInterior => "comunicado_br_interior.pdf",
            ReportType::SpCapital => "comunicado_sp_capital.pdf",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "br-interior" | "br_interior" | "br interior" | "interior" | "br" => {
                Ok(ReportType::BrInterior)
            }
            "sp-capital" | "sp_capital" | "sp capital" | "capital" | "sp" => {
                Ok(ReportType::SpCapital)
            }
            _ => Err(ReportError::UnknownReportType(s.to_string())),
        }
    }
}

/// One BR INTERIOR line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorRecord {
    pub linha: i64,
    pub ramal: i64,
    pub cidade: String,
    pub qtde: u32,
}

impl InteriorRecord {
    pub fn footer_text(&self) -> String {
        format!(
            "LINHA {} - RAMAL {} - CIDADE {} - QTDE. {}",
            self.linha, self.ramal, self.cidade, self.qtde
        )
    }
}

/// One SP CAPITAL line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalRecord {
    pub filial: String,
    pub qtde: u32,
}

impl CapitalRecord {
    pub fn footer_text(&self) -> String {
        format!("FILIAL {} - QTDE. {}", self.filial, self.qtde)
    }
}

/// A validated record of either report type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Interior(InteriorRecord),
    Capital(CapitalRecord),
}

impl Record {
    /// Report type this record belongs to
    pub fn report_type(&self) -> ReportType {
        match self {
            Record::Interior(_) => ReportType::BrInterior,
            Record::Capital(_) => ReportType::SpCapital,
        }
    }

    /// Number of pages this record expands to
    pub fn qtde(&self) -> u32 {
        match self {
            Record::Interior(r) => r.qtde,
            Record::Capital(r) => r.qtde,
        }
    }

    /// Footer label printed on every page of this record
    pub fn footer_text(&self) -> String {
        match self {
            Record::Interior(r) => r.footer_text(),
            Record::Capital(r) => r.footer_text(),
        }
    }
}

impl From<InteriorRecord> for Record {
    fn from(record: InteriorRecord) -> Self {
        Record::Interior(record)
    }
}

impl From<CapitalRecord> for Record {
    fn from(record: CapitalRecord) -> Self {
        Record::Capital(record)
    }
}
