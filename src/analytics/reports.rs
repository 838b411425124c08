//! On-demand export of history datasets
//!
//! An export runs in four steps:
//!
//! 1. Ask the data service to record a generated report (skipped for the
//!    `reports` dataset itself). A failure here is logged and ignored.
//! 2. Fetch the full history of the dataset.
//! 3. Map it to a [`TabularModel`](super::tabular::TabularModel).
//! 4. Encode on a blocking worker and wrap the bytes into an [`Artifact`].
//!
//! # Example Usage
//!
//! ```no_run
//! use reward360_analytics::analytics::{ExportFormat, ReportExporter, StatusMessage};
//! use reward360_analytics::core::{EntityKind, ExportConfig};
//! use reward360_analytics::runtime::HttpDataSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> reward360_analytics::Result<()> {
//! let source = Arc::new(HttpDataSource::builder().build()?);
//! let exporter = ReportExporter::new(source, ExportConfig::default());
//!
//! let outcome = exporter.save(EntityKind::Offers, ExportFormat::Pdf).await;
//! let banner = StatusMessage::for_export(EntityKind::Offers, ExportFormat::Pdf, &outcome);
//! println!("{}", banner.text);
//! # Ok(())
//! # }
//! ```

use super::export::{encoder_for, Artifact, ExportContext, ExportFormat};
use super::mapper::ReportRowMapper;
use super::tabular::TimestampFormatter;
use crate::core::{AnalyticsError, EntityKind, ExportConfig, Result};
use crate::runtime::DataSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long transient banners stay visible
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Info,
    Error,
}

/// User-facing outcome of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    /// `None` means the banner stays until dismissed
    #[serde(skip)]
    pub auto_clear: Option<Duration>,
}

impl StatusMessage {
    pub fn for_export<T>(kind: EntityKind, format: ExportFormat, outcome: &Result<T>) -> Self {
        match outcome {
            Ok(_) => Self {
                text: format!(
                    "Successfully exported {} data as {}!",
                    kind,
                    format.label()
                ),
                level: StatusLevel::Success,
                auto_clear: Some(BANNER_TIMEOUT),
            },
            Err(err @ AnalyticsError::NoExportData(_)) => Self {
                text: err.to_string(),
                level: StatusLevel::Info,
                auto_clear: Some(BANNER_TIMEOUT),
            },
            Err(err) => Self {
                text: format!("Failed to export {} data. Error: {}", kind, err),
                level: StatusLevel::Error,
                auto_clear: None,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

/// Fetches, maps and encodes one dataset per call
pub struct ReportExporter {
    source: Arc<dyn DataSource>,
    mapper: ReportRowMapper,
    config: ExportConfig,
}

impl ReportExporter {
    pub fn new(source: Arc<dyn DataSource>, config: ExportConfig) -> Self {
        Self {
            mapper: ReportRowMapper::new(TimestampFormatter::from_config(&config)),
            source,
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export stamped with the current time
    pub async fn export(&self, kind: EntityKind, format: ExportFormat) -> Result<Artifact> {
        self.export_at(kind, format, Utc::now()).await
    }

    /// Export with an explicit generation time; identical inputs give identical documents
    pub async fn export_at(
        &self,
        kind: EntityKind,
        format: ExportFormat,
        generated_at: DateTime<Utc>,
    ) -> Result<Artifact> {
        if let Some(metric) = kind.trend_metric() {
            if let Err(e) = self.source.generate_report(metric).await {
                warn!(metric = %metric, error = %e, "report generation trigger failed, exporting anyway");
            }
        }

        let records = self.source.history(kind).await.map_err(|e| {
            warn!(entity = %kind, error = %e, "history fetch failed");
            AnalyticsError::source_unavailable(format!("{} history", kind), e)
        })?;

        if records.is_empty() {
            info!(entity = %kind, "nothing to export");
            return Err(AnalyticsError::NoExportData(kind));
        }

        let table = self.mapper.map_to_table(kind, &records)?;
        debug!(entity = %kind, rows = table.len(), %format, "encoding export");

        let ctx = ExportContext::new(kind, generated_at, &self.config);
        let encoder = encoder_for(format, &self.config);
        let bytes = tokio::task::spawn_blocking(move || encoder.encode(&table, &ctx)).await??;

        let artifact = Artifact {
            file_name: format.file_name(kind),
            content_type: format.content_type(),
            bytes,
        };
        info!(file = %artifact.file_name, bytes = artifact.len(), "export ready");
        Ok(artifact)
    }

    /// Export and write into the configured output directory
    pub async fn save(&self, kind: EntityKind, format: ExportFormat) -> Result<PathBuf> {
        let artifact = self.export(kind, format).await?;
        let dir = self.config.output_dir.clone();
        let path = tokio::task::spawn_blocking(move || artifact.write_to(dir)).await??;
        info!(path = %path.display(), "export written");
        Ok(path)
    }
}
