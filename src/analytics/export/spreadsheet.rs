use super::{ExportContext, ExportFormat, ReportEncoder};
use crate::analytics::tabular::{Cell, TabularModel};
use crate::core::{AnalyticsError, Result};
use rust_xlsxwriter::{DocProperties, Format, Workbook};
use tracing::debug;

/// Single-sheet workbook named `"{entity} History"`, e.g. `users History`
///
/// Integer cells are written as numbers, everything else as strings.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetEncoder;

impl SpreadsheetEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn sheet_name(ctx: &ExportContext) -> String {
        format!("{} History", ctx.kind)
    }
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| AnalyticsError::export(format!("column {} exceeds sheet width", index)))
}

fn row(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| AnalyticsError::export(format!("row {} exceeds sheet height", index)))
}

impl ReportEncoder for SpreadsheetEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }

    fn encode(&self, table: &TabularModel, ctx: &ExportContext) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let properties = DocProperties::new()
            .set_title(&format!("{} {} History", ctx.brand, ctx.kind.title()))
            .set_author(&ctx.brand);
        workbook.set_properties(&properties);

        let bold = Format::new().set_bold();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(&Self::sheet_name(ctx))?;

            for (c, title) in table.header().iter().enumerate() {
                sheet.write_string_with_format(0, column(c)?, title, &bold)?;
            }

            for (r, cells) in table.rows().iter().enumerate() {
                let r = row(r + 1)?;
                for (c, cell) in cells.iter().enumerate() {
                    let c = column(c)?;
                    match cell {
                        Cell::Text(text) => sheet.write_string(r, c, text)?,
                        Cell::Integer(n) => sheet.write_number(r, c, *n as f64)?,
                    };
                }
            }

            sheet.autofit();
        }

        let bytes = workbook.save_to_buffer()?;
        debug!(rows = table.len(), bytes = bytes.len(), "encoded spreadsheet");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityKind, ExportConfig};
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::Utc;
    use std::io::Cursor;

    #[test]
    fn test_workbook_reads_back() {
        let mut table = TabularModel::new(["Confirmation Code", "Cost Points", "Offer Title"]);
        table
            .push_row(vec![Cell::text("RC-1"), Cell::Integer(150), Cell::text("Spa Day")])
            .unwrap();
        table
            .push_row(vec![Cell::text("RC-2"), Cell::Integer(0), Cell::text("")])
            .unwrap();

        let ctx = ExportContext::new(EntityKind::Redemptions, Utc::now(), &ExportConfig::default());
        let bytes = SpreadsheetEncoder::new().encode(&table, &ctx).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["redemptions History".to_string()]);

        let range = workbook.worksheet_range("redemptions History").unwrap();
        assert_eq!(range.get_size(), (3, 3));
        assert_eq!(
            range.get((0, 0)),
            Some(&Data::String("Confirmation Code".to_string()))
        );
        assert_eq!(range.get((1, 1)), Some(&Data::Float(150.0)));
        assert_eq!(range.get((1, 2)), Some(&Data::String("Spa Day".to_string())));
        assert_eq!(range.get((2, 1)), Some(&Data::Float(0.0)));
    }

    #[test]
    fn test_header_only_workbook() {
        let table = TabularModel::new(["ID", "Metric", "Generated At"]);
        let ctx = ExportContext::new(EntityKind::Reports, Utc::now(), &ExportConfig::default());
        let bytes = SpreadsheetEncoder::new().encode(&table, &ctx).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("reports History").unwrap();
        assert_eq!(range.get_size(), (1, 3));
    }

    #[test]
    fn test_sheet_name_uses_dataset_identifier() {
        let ctx = ExportContext::new(EntityKind::Users, Utc::now(), &ExportConfig::default());
        assert_eq!(SpreadsheetEncoder::sheet_name(&ctx), "users History");
    }
}
