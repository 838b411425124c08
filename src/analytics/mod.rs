//! Analytics aggregation and report export
//!
//! This module turns raw data-service output into dashboard views and
//! downloadable exports.
//!
//! # Overview
//!
//! - **Metrics Aggregator**: concurrent fan-out over every dashboard input with
//!   per-source degradation
//! - **Metrics**: category breakdown and the top redeemed offers leaderboard
//! - **Tabular Model**: the format-neutral table every encoder consumes
//! - **Row Mapper**: fixed column layouts for the four datasets
//! - **Export Encoders**: delimited text, spreadsheet workbook and paginated document
//! - **Report Exporter**: fetch, map, encode and name one artifact
//!
//! # Examples
//!
//! ```no_run
//! use reward360_analytics::analytics::MetricsAggregator;
//! use reward360_analytics::runtime::HttpDataSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> reward360_analytics::Result<()> {
//! let source = Arc::new(HttpDataSource::builder().build()?);
//! let aggregator = MetricsAggregator::new(source, 5);
//!
//! let snapshot = aggregator.aggregate().await;
//! if let Some(err) = snapshot.escalation() {
//!     eprintln!("{}", err);
//! }
//! for entry in &snapshot.top_offers {
//!     println!("#{} {} ({})", entry.rank, entry.title, entry.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod mapper;
pub mod metrics;
pub mod reports;
pub mod tabular;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
pub mod analytics_test;



pub use export::{Artifact, ExportContext, ExportFormat, ReportEncoder};
pub use mapper::ReportRowMapper;
pub use metrics::{CategoryBreakdown, ChartSeries, RankedEntry, TopNRanker};
pub use reports::{ReportExporter, StatusLevel, StatusMessage};
pub use tabular::{Cell, TabularModel, TimestampFormatter};

use crate::core::{
    AnalyticsError, DashboardConfig, EntityKind, HistoryRecord, KpiSet, Result, TrendMetric,
    TrendSeries,
};
use crate::runtime::DataSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// The three trend series shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSet {
    pub users: TrendSeries,
    pub offers: TrendSeries,
    pub redemptions: TrendSeries,
}

impl TrendSet {
    pub fn get(&self, metric: TrendMetric) -> &TrendSeries {
        match metric {
            TrendMetric::Users => &self.users,
            TrendMetric::Offers => &self.offers,
            TrendMetric::Redemptions => &self.redemptions,
        }
    }

    /// Shared x-axis for a stacked chart: the first non-empty label sequence
    pub fn stacked_labels(&self) -> &[String] {
        TrendMetric::ALL
            .iter()
            .map(|metric| self.get(*metric).labels())
            .find(|labels| !labels.is_empty())
            .unwrap_or(&[])
    }
}

/// One dashboard input that degraded to its fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub origin: String,
    pub message: String,
}

/// Everything the dashboard renders from one aggregation pass
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// All zero when the KPI fetch failed
    pub kpis: KpiSet,
    /// Set when the KPI fetch failed; the dashboard shows an error state
    pub kpi_error: Option<String>,
    pub trends: TrendSet,
    pub categories: CategoryBreakdown,
    pub top_offers: Vec<RankedEntry>,
    /// Isolated inputs that fell back to empty
    pub failures: Vec<SourceFailure>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn kpis_available(&self) -> bool {
        self.kpi_error.is_none()
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty() || !self.kpis_available()
    }

    /// Chart-ready breakdown, with the placeholder slice when empty
    pub fn category_chart(&self) -> ChartSeries {
        self.categories.to_chart()
    }

    /// The error banner for a failed KPI fetch
    pub fn escalation(&self) -> Option<AnalyticsError> {
        self.kpi_error
            .as_ref()
            .map(|message| AnalyticsError::all_sources_unavailable(message.clone()))
    }

    /// Fail the whole snapshot when the KPI fetch failed
    pub fn into_result(self) -> Result<Self> {
        match self.escalation() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Concurrent dashboard aggregation
///
/// Every call re-fetches. The KPI fetch, the three trend fetches and the offer
/// and redemption histories run concurrently and are joined before any derived
/// view is computed. A failing trend or history source degrades to empty and
/// never cancels its siblings; only a KPI failure is escalated.
#[derive(Clone)]
pub struct MetricsAggregator {
    source: Arc<dyn DataSource>,
    ranker: TopNRanker,
}

impl MetricsAggregator {
    pub fn new(source: Arc<dyn DataSource>, top_offers: usize) -> Self {
        Self {
            source,
            ranker: TopNRanker::new(top_offers),
        }
    }

    pub fn from_config(source: Arc<dyn DataSource>, config: &DashboardConfig) -> Self {
        Self::new(source, config.top_offers)
    }

    pub async fn aggregate(&self) -> DashboardSnapshot {
        let source = &self.source;
        debug!("aggregating dashboard inputs");

        let (kpis, users, offers, redemptions, offer_history, redemption_history) = tokio::join!(
            source.kpis(),
            source.trend(TrendMetric::Users),
            source.trend(TrendMetric::Offers),
            source.trend(TrendMetric::Redemptions),
            source.history(EntityKind::Offers),
            source.history(EntityKind::Redemptions),
        );

        let mut failures = Vec::new();
        let trends = TrendSet {
            users: degrade("users trend", users, &mut failures),
            offers: degrade("offers trend", offers, &mut failures),
            redemptions: degrade("redemptions trend", redemptions, &mut failures),
        };
        let offer_history = degrade("offers history", offer_history, &mut failures);
        let redemption_history = degrade("redemptions history", redemption_history, &mut failures);

        let categories =
            CategoryBreakdown::from_offers(offer_history.iter().filter_map(HistoryRecord::as_offer));
        let top_offers = self
            .ranker
            .rank(redemption_history.iter().filter_map(HistoryRecord::as_redemption));

        let (kpis, kpi_error) = match kpis {
            Ok(kpis) => (kpis, None),
            Err(e) => {
                error!(error = %e, "KPI fetch failed");
                (KpiSet::default(), Some(e.to_string()))
            }
        };

        DashboardSnapshot {
            kpis,
            kpi_error,
            trends,
            categories,
            top_offers,
            failures,
            generated_at: Utc::now(),
        }
    }
}

fn degrade<T: Default>(origin: &str, result: Result<T>, failures: &mut Vec<SourceFailure>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            let failure = AnalyticsError::source_unavailable(origin, &e);
            warn!(error = %failure, "falling back to empty");
            failures.push(SourceFailure {
                origin: origin.to_string(),
                message: e.to_string(),
            });
            T::default()
        }
    }
}
