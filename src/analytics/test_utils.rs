//! Shared test utilities for the analytics module
//!
//! [`MockDataSource`] answers from scripted data, records every call, can be
//! told to fail individual calls and can hold every call at a barrier to prove
//! that requests are in flight at the same time.

use crate::core::{
    AnalyticsError, EntityKind, HistoryRecord, KpiSet, OfferRecord, RecordId, RedemptionRecord,
    ReportRecord, Result, TrendMetric, TrendSeries, UserRecord,
};
use crate::runtime::DataSource;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Barrier;

/// One data-source request, as seen by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Kpis,
    Trend(TrendMetric),
    History(EntityKind),
    GenerateReport(TrendMetric),
}

/// Scriptable in-memory [`DataSource`]
#[derive(Default)]
pub struct MockDataSource {
    kpis: KpiSet,
    trends: HashMap<TrendMetric, TrendSeries>,
    histories: HashMap<EntityKind, Vec<HistoryRecord>>,
    failing: HashSet<Call>,
    barrier: Option<Arc<Barrier>>,
    calls: Mutex<Vec<Call>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kpis(mut self, users: u64, offers: u64, redemptions: u64) -> Self {
        self.kpis = KpiSet {
            users,
            offers,
            redemptions,
        };
        self
    }

    pub fn with_trend(mut self, metric: TrendMetric, labels: &[&str], data: &[f64]) -> Self {
        self.trends.insert(metric, series(labels, data));
        self
    }

    pub fn with_history(mut self, kind: EntityKind, records: Vec<HistoryRecord>) -> Self {
        self.histories.insert(kind, records);
        self
    }

    /// Make `call` fail with a connection error
    pub fn failing(mut self, call: Call) -> Self {
        self.failing.insert(call);
        self
    }

    /// Every call waits at `barrier` before answering
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    async fn enter(&self, call: Call) -> Result<()> {
        self.calls.lock().push(call);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.failing.contains(&call) {
            return Err(AnalyticsError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("scripted failure for {:?}", call),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn kpis(&self) -> Result<KpiSet> {
        self.enter(Call::Kpis).await?;
        Ok(self.kpis)
    }

    async fn trend(&self, metric: TrendMetric) -> Result<TrendSeries> {
        self.enter(Call::Trend(metric)).await?;
        Ok(self.trends.get(&metric).cloned().unwrap_or_default())
    }

    async fn history(&self, kind: EntityKind) -> Result<Vec<HistoryRecord>> {
        self.enter(Call::History(kind)).await?;
        Ok(self.histories.get(&kind).cloned().unwrap_or_default())
    }

    async fn generate_report(&self, metric: TrendMetric) -> Result<()> {
        self.enter(Call::GenerateReport(metric)).await
    }
}

pub fn series(labels: &[&str], data: &[f64]) -> TrendSeries {
    TrendSeries::new(labels.iter().map(|l| l.to_string()).collect(), data.to_vec())
        .expect("fixture series lengths match")
}

pub fn offer(title: &str, category: Option<&str>) -> HistoryRecord {
    HistoryRecord::Offer(OfferRecord {
        id: None,
        title: Some(title.to_string()),
        category: category.map(String::from),
        description: Some(format!("{} for loyal members", title)),
        cost_points: Some(100),
        active: Some(true),
        start_date: Some("2024-05-01T10:00:00Z".to_string()),
        tier_level: None,
    })
}

pub fn redemption(offer_title: Option<&str>) -> HistoryRecord {
    HistoryRecord::Redemption(RedemptionRecord {
        confirmation_code: Some("RC-0001".to_string()),
        transaction_id: Some("TX-0001".to_string()),
        date: Some("2024-05-02T08:15:00Z".to_string()),
        cost_points: Some(100),
        offer_title: offer_title.map(String::from),
    })
}

pub fn user(name: &str) -> HistoryRecord {
    HistoryRecord::User(UserRecord {
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
        role: Some("USER".to_string()),
        created_at: Some("2024-01-15T12:00:00Z".to_string()),
    })
}

pub fn report(id: i64, metric: &str) -> HistoryRecord {
    HistoryRecord::Report(ReportRecord {
        id: Some(RecordId::Number(id)),
        metric: Some(metric.to_string()),
        generated_at: Some("2024-06-01T00:00:00Z".to_string()),
    })
}

/// Redemptions whose titles follow `titles` in order
pub fn redemptions_titled(titles: &[&str]) -> Vec<HistoryRecord> {
    titles.iter().map(|t| redemption(Some(t))).collect()
}

/// A source with data behind every dashboard input and export
pub fn populated_source() -> MockDataSource {
    MockDataSource::new()
        .with_kpis(120, 14, 87)
        .with_trend(TrendMetric::Users, &["Jan", "Feb", "Mar"], &[10.0, 25.0, 40.0])
        .with_trend(TrendMetric::Offers, &["Jan", "Feb", "Mar"], &[2.0, 4.0, 8.0])
        .with_trend(TrendMetric::Redemptions, &["Jan", "Feb", "Mar"], &[5.0, 9.0, 30.0])
        .with_history(
            EntityKind::Offers,
            vec![
                offer("Spa Day", Some("Wellness")),
                offer("Coffee", Some("Food")),
                offer("Mystery Box", None),
                offer("Pizza", Some("Food")),
            ],
        )
        .with_history(
            EntityKind::Redemptions,
            redemptions_titled(&["Coffee", "Pizza", "Coffee", "Spa Day", "Pizza", "Coffee"]),
        )
        .with_history(EntityKind::Users, vec![user("Asha"), user("Ravi")])
        .with_history(EntityKind::Reports, vec![report(1, "users"), report(2, "offers")])
}
