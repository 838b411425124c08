//! Export encoders
//!
//! Each encoder is a pure function from a [`TabularModel`] plus an
//! [`ExportContext`] to bytes. [`ReportExporter`](super::reports::ReportExporter)
//! wraps the bytes into a named [`Artifact`].

pub mod delimited;
pub mod document;
pub mod spreadsheet;

pub use delimited::DelimitedTextEncoder;
pub use document::{DocumentEncoder, DrawOp, Page, PdfDocument};
pub use spreadsheet::SpreadsheetEncoder;

use super::tabular::{TabularModel, TimestampFormatter};
use crate::core::{AnalyticsError, EntityKind, ExportConfig, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output file type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

    /// Upper-case label used in status banners
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "EXCEL",
            ExportFormat::Pdf => "PDF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// `users-history.csv`, `offers-history.xlsx`, `reports-report.pdf`
    pub fn file_name(&self, kind: EntityKind) -> String {
        match self {
            ExportFormat::Pdf => format!("{}-report.{}", kind, self.extension()),
            _ => format!("{}-history.{}", kind, self.extension()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Pdf => write!(f, "pdf"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AnalyticsError::invalid_input(format!(
                "unknown export format '{}'",
                other
            ))),
        }
    }
}

/// A finished, downloadable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write into `dir` under the artifact's own file name
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Everything an encoder needs besides the table itself
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub kind: EntityKind,
    pub brand: String,
    pub generated_at: DateTime<Utc>,
    pub timestamps: TimestampFormatter,
}

impl ExportContext {
    pub fn new(kind: EntityKind, generated_at: DateTime<Utc>, config: &ExportConfig) -> Self {
        Self {
            kind,
            brand: config.brand.clone(),
            generated_at,
            timestamps: TimestampFormatter::from_config(config),
        }
    }
}

/// Serializes a table into one output format
pub trait ReportEncoder: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn encode(&self, table: &TabularModel, ctx: &ExportContext) -> Result<Vec<u8>>;
}

/// The encoder for `format`, configured from export settings
pub fn encoder_for(format: ExportFormat, config: &ExportConfig) -> Box<dyn ReportEncoder> {
    match format {
        ExportFormat::Csv => Box::new(DelimitedTextEncoder::from_config(config)),
        ExportFormat::Excel => Box::new(SpreadsheetEncoder::new()),
        ExportFormat::Pdf => Box::new(DocumentEncoder::new()),
    }
}
