use super::{ExportContext, ExportFormat, ReportEncoder};
use crate::analytics::tabular::TabularModel;
use crate::core::{AnalyticsError, CsvQuoting, ExportConfig, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

/// Header line followed by one line per row, `\n` separated, no trailing newline
///
/// With [`CsvQuoting::Never`] cells are written verbatim, so a cell holding the
/// delimiter produces extra columns when read back.
#[derive(Debug, Clone)]
pub struct DelimitedTextEncoder {
    delimiter: u8,
    quoting: CsvQuoting,
}

impl Default for DelimitedTextEncoder {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quoting: CsvQuoting::Never,
        }
    }
}

impl DelimitedTextEncoder {
    pub fn new(delimiter: u8, quoting: CsvQuoting) -> Self {
        Self { delimiter, quoting }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        // Config validation guarantees an ASCII delimiter
        let delimiter = u8::try_from(config.delimiter).unwrap_or(b',');
        Self::new(delimiter, config.csv_quoting)
    }

    fn quote_style(&self) -> QuoteStyle {
        match self.quoting {
            CsvQuoting::Never => QuoteStyle::Never,
            CsvQuoting::Necessary => QuoteStyle::Necessary,
        }
    }
}

impl ReportEncoder for DelimitedTextEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn encode(&self, table: &TabularModel, _ctx: &ExportContext) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(self.quote_style())
            .terminator(Terminator::Any(b'\n'))
            .flexible(false)
            .from_writer(Vec::new());

        writer.write_record(table.header())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }

        let mut bytes = writer
            .into_inner()
            .map_err(|e| AnalyticsError::export(format!("failed to flush CSV writer: {}", e)))?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }

        debug!(rows = table.len(), bytes = bytes.len(), "encoded delimited text");
        Ok(bytes)
    }
}
