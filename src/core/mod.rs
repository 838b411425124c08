//! Domain types, configuration and the error taxonomy

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AdminConfig, AdminEndpoint, Config, CsvQuoting, DashboardConfig, DataServiceConfig,
    ExportConfig,
};
pub use error::{AnalyticsError, Result};
pub use types::{
    EntityKind, HistoryRecord, KpiSet, OfferRecord, RecordId, RedemptionRecord, ReportRecord,
    TrendMetric, TrendSeries, UserRecord,
};
