//! # reward360-analytics
//!
//! Analytics aggregation and multi-format report export for the Reward360
//! loyalty platform.
//!
//! The crate pulls KPIs, trend series and entity histories from the analytics
//! data service, derives dashboard views (category breakdown, top redeemed
//! offers) and exports any of the four history datasets as delimited text, a
//! spreadsheet workbook or a paginated PDF document.
//!
//! ## Layout
//!
//! - [`core`]: domain types, configuration and the error taxonomy
//! - [`runtime`]: the HTTP data source and the sticky admin endpoint resolver
//! - [`analytics`]: aggregation, row mapping and the export encoders
//! - `cli`: the operator command line (behind the `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reward360_analytics::analytics::{ExportFormat, MetricsAggregator, ReportExporter};
//! use reward360_analytics::core::{Config, EntityKind};
//! use reward360_analytics::runtime::HttpDataSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> reward360_analytics::Result<()> {
//! let config = Config::default().with_base_url("https://gateway.reward360.example");
//! let source = Arc::new(HttpDataSource::new(config.data_service.clone())?);
//!
//! let snapshot = MetricsAggregator::from_config(source.clone(), &config.dashboard)
//!     .aggregate()
//!     .await;
//! println!("{} users", snapshot.kpis.users);
//!
//! let exporter = ReportExporter::new(source, config.export.clone());
//! let artifact = exporter.export(EntityKind::Offers, ExportFormat::Csv).await?;
//! println!("{} ({} bytes)", artifact.file_name, artifact.len());
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod core;
pub mod runtime;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::analytics::{
    Artifact, DashboardSnapshot, ExportFormat, MetricsAggregator, ReportExporter, StatusMessage,
};
pub use crate::core::{AnalyticsError, Config, EntityKind, Result, TrendMetric};
pub use crate::runtime::{DataSource, EndpointResolver, HttpDataSource, OfferAdminClient};
