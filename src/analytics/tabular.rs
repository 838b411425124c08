//! Format-neutral table shared by every export encoder
//!
//! All default-coalescing of record fields happens in [`safe_cell`]; mappers
//! describe each field with a [`FieldValue`] and never handle `None` directly.

use crate::core::{AnalyticsError, ExportConfig, RecordId, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Integer(i64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Integer(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// Header row plus body rows; every row is exactly as wide as the header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularModel {
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TabularModel {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(AnalyticsError::RowWidth {
                expected: self.header.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rewrite every text cell in the body, leaving the header untouched
    pub fn map_text<F>(&self, mut f: F) -> TabularModel
    where
        F: FnMut(&str) -> String,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Text(s) => Cell::Text(f(s)),
                        other => other.clone(),
                    })
                    .collect()
            })
            .collect();

        TabularModel {
            header: self.header.clone(),
            rows,
        }
    }
}

/// Renders ISO instants for people; anything else passes through
#[derive(Debug, Clone)]
pub struct TimestampFormatter {
    offset: FixedOffset,
    pattern: String,
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::new(0, "%-m/%-d/%Y, %-I:%M:%S %p")
    }
}

impl TimestampFormatter {
    /// Offsets outside +/-24h fall back to UTC
    pub fn new(utc_offset_minutes: i32, pattern: impl Into<String>) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self {
            offset,
            pattern: pattern.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.utc_offset_minutes, config.timestamp_format.clone())
    }

    /// Zoned instants are shifted to the display offset; zone-less date-times
    /// are already wall-clock time. Plain dates and anything unparseable are
    /// returned unchanged.
    pub fn format(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return instant
                .with_timezone(&self.offset)
                .format(&self.pattern)
                .to_string();
        }
        if let Ok(local) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return local.format(&self.pattern).to_string();
        }
        raw.to_string()
    }

    pub fn format_instant(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(&self.pattern)
            .to_string()
    }
}

/// A raw record field and how it should default
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    /// Missing becomes `""`
    Text(Option<&'a str>),
    /// Missing or empty becomes the given fallback
    TextOr(Option<&'a str>, &'static str),
    /// Missing becomes `0`
    Points(Option<i64>),
    /// `"Yes"` / `"No"`, missing is `"No"`
    Flag(Option<bool>),
    /// ISO instants are rendered; missing becomes `""`
    Timestamp(Option<&'a str>),
    /// Numeric or string identifier as text; missing becomes `""`
    Id(Option<&'a RecordId>),
}

/// The single place where record fields become cells
pub fn safe_cell(field: FieldValue<'_>, timestamps: &TimestampFormatter) -> Cell {
    match field {
        FieldValue::Text(value) => Cell::text(value.unwrap_or_default()),
        FieldValue::TextOr(value, fallback) => match value {
            Some(s) if !s.is_empty() => Cell::text(s),
            _ => Cell::text(fallback),
        },
        FieldValue::Points(value) => Cell::Integer(value.unwrap_or(0)),
        FieldValue::Flag(value) => Cell::text(if value.unwrap_or(false) { "Yes" } else { "No" }),
        FieldValue::Timestamp(value) => match value {
            Some(s) if !s.is_empty() => Cell::Text(timestamps.format(s)),
            _ => Cell::text(""),
        },
        FieldValue::Id(value) => Cell::Text(value.map(ToString::to_string).unwrap_or_default()),
    }
}
