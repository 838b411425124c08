//! Per-dataset column layouts

use super::tabular::{safe_cell, Cell, FieldValue, TabularModel, TimestampFormatter};
use crate::core::{AnalyticsError, EntityKind, HistoryRecord, Result};
use tracing::error;

/// Tier shown for offers open to every tier
const ALL_TIERS: &str = "All";

/// Turns history records into a [`TabularModel`] with a fixed header per dataset
#[derive(Debug, Clone, Default)]
pub struct ReportRowMapper {
    timestamps: TimestampFormatter,
}

impl ReportRowMapper {
    pub fn new(timestamps: TimestampFormatter) -> Self {
        Self { timestamps }
    }

    pub fn timestamps(&self) -> &TimestampFormatter {
        &self.timestamps
    }

    pub fn header(kind: EntityKind) -> &'static [&'static str] {
        match kind {
            EntityKind::Users => &["Name", "Email", "Phone", "Role", "Created At"],
            EntityKind::Offers => &[
                "Title",
                "Category",
                "Description",
                "Cost Points",
                "Active",
                "Created At",
                "Tier Level",
            ],
            EntityKind::Redemptions => &[
                "Confirmation Code",
                "Transaction ID",
                "Date",
                "Cost Points",
                "Offer Title",
            ],
            EntityKind::Reports => &["ID", "Metric", "Generated At"],
        }
    }

    /// One row per record, in input order
    pub fn map_to_table(&self, kind: EntityKind, records: &[HistoryRecord]) -> Result<TabularModel> {
        let mut table = TabularModel::new(Self::header(kind).iter().copied());

        for record in records {
            if record.kind() != kind {
                error!(expected = %kind, actual = %record.kind(), "record does not belong to dataset");
                return Err(AnalyticsError::invalid_entity_kind(format!(
                    "{} record in {} export",
                    record.kind(),
                    kind
                )));
            }
            table.push_row(self.row(record))?;
        }

        Ok(table)
    }

    fn row(&self, record: &HistoryRecord) -> Vec<Cell> {
        let ts = &self.timestamps;
        let fields: Vec<FieldValue<'_>> = match record {
            HistoryRecord::User(u) => vec![
                FieldValue::Text(u.name.as_deref()),
                FieldValue::Text(u.email.as_deref()),
                FieldValue::Text(u.phone.as_deref()),
                FieldValue::Text(u.role.as_deref()),
                FieldValue::Text(u.created_at.as_deref()),
            ],
            HistoryRecord::Offer(o) => vec![
                FieldValue::Text(o.title.as_deref()),
                FieldValue::Text(o.category.as_deref()),
                FieldValue::Text(o.description.as_deref()),
                FieldValue::Points(o.cost_points),
                FieldValue::Flag(o.active),
                FieldValue::Text(o.start_date.as_deref()),
                FieldValue::TextOr(o.tier_level.as_deref(), ALL_TIERS),
            ],
            HistoryRecord::Redemption(r) => vec![
                FieldValue::Text(r.confirmation_code.as_deref()),
                FieldValue::Text(r.transaction_id.as_deref()),
                FieldValue::Text(r.date.as_deref()),
                FieldValue::Points(r.cost_points),
                FieldValue::Text(r.offer_title.as_deref()),
            ],
            // Only the report log's generation time is reformatted
            HistoryRecord::Report(r) => vec![
                FieldValue::Id(r.id.as_ref()),
                FieldValue::Text(r.metric.as_deref()),
                FieldValue::Timestamp(r.generated_at.as_deref()),
            ],
        };

        fields.into_iter().map(|field| safe_cell(field, ts)).collect()
    }
}
