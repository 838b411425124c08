//! Tests for dashboard aggregation

use super::test_utils::*;
use super::*;
use std::time::Duration;
use tokio::sync::Barrier;

fn aggregator(source: MockDataSource) -> (MetricsAggregator, Arc<MockDataSource>) {
    let source = Arc::new(source);
    (MetricsAggregator::new(source.clone(), 5), source)
}

#[tokio::test]
async fn test_aggregate_all_sources_healthy() {
    let (aggregator, _) = aggregator(populated_source());
    let snapshot = aggregator.aggregate().await;

    assert!(snapshot.kpis_available());
    assert!(!snapshot.is_degraded());
    assert!(snapshot.escalation().is_none());
    assert_eq!(snapshot.kpis.users, 120);
    assert_eq!(snapshot.trends.redemptions.data(), &[5.0, 9.0, 30.0]);

    assert_eq!(snapshot.categories.get("Food"), Some(2));
    assert_eq!(snapshot.categories.get("Wellness"), Some(1));
    assert_eq!(snapshot.categories.get("Other"), Some(1));

    let titles: Vec<_> = snapshot.top_offers.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Coffee", "Pizza", "Spa Day"]);
    assert_eq!(snapshot.top_offers[0].count, 3);
}

#[tokio::test]
async fn test_failing_sources_are_isolated() {
    let source = populated_source()
        .failing(Call::Trend(TrendMetric::Users))
        .failing(Call::History(EntityKind::Offers));
    let (aggregator, source) = aggregator(source);

    let snapshot = aggregator.aggregate().await;

    assert!(snapshot.kpis_available());
    assert!(snapshot.escalation().is_none());
    assert!(snapshot.trends.users.is_empty());
    assert_eq!(snapshot.trends.offers.len(), 3);
    assert_eq!(snapshot.trends.redemptions.len(), 3);

    // Empty breakdown charts as a placeholder slice
    assert!(snapshot.categories.is_empty());
    let chart = snapshot.category_chart();
    assert_eq!(chart.labels, vec!["No Data"]);
    assert_eq!(chart.data, vec![1]);

    // Redemptions still rank
    assert_eq!(snapshot.top_offers.len(), 3);

    let origins: Vec<_> = snapshot.failures.iter().map(|f| f.origin.as_str()).collect();
    assert_eq!(origins, vec!["users trend", "offers history"]);
    assert!(snapshot.is_degraded());

    // Every source was asked even though two failed
    assert_eq!(source.calls().len(), 6);
}

#[tokio::test]
async fn test_kpi_failure_escalates_but_trends_render() {
    let (aggregator, _) = aggregator(populated_source().failing(Call::Kpis));
    let snapshot = aggregator.aggregate().await;

    assert!(!snapshot.kpis_available());
    assert_eq!(snapshot.kpis, KpiSet::default());
    assert_eq!(snapshot.trends.users.len(), 3);
    assert_eq!(snapshot.trends.stacked_labels().len(), 3);

    let err = snapshot.escalation().unwrap();
    assert!(matches!(err, AnalyticsError::AllSourcesUnavailable(_)));
    assert!(!err.is_non_fatal());

    assert!(matches!(
        snapshot.into_result(),
        Err(AnalyticsError::AllSourcesUnavailable(_))
    ));
}

#[tokio::test]
async fn test_requests_are_issued_concurrently() {
    // Six requests must all be in flight before any of them may finish
    let barrier = Arc::new(Barrier::new(6));
    let (aggregator, source) = aggregator(populated_source().with_barrier(barrier));

    let snapshot = tokio::time::timeout(Duration::from_secs(5), aggregator.aggregate())
        .await
        .expect("aggregation fetches must run concurrently");

    assert!(snapshot.kpis_available());
    assert_eq!(source.count(Call::Kpis), 1);
    assert_eq!(source.count(Call::History(EntityKind::Redemptions)), 1);
}

#[tokio::test]
async fn test_every_aggregation_refetches() {
    let (aggregator, source) = aggregator(populated_source());
    aggregator.aggregate().await;
    aggregator.aggregate().await;

    assert_eq!(source.count(Call::Kpis), 2);
    assert_eq!(source.count(Call::Trend(TrendMetric::Offers)), 2);
    assert_eq!(source.count(Call::History(EntityKind::Offers)), 2);
}

#[tokio::test]
async fn test_category_and_ranking_scenarios() {
    let source = MockDataSource::new()
        .with_history(
            EntityKind::Offers,
            vec![
                offer("A", Some("Fashion")),
                offer("B", None),
                offer("C", Some("Fashion")),
            ],
        )
        .with_history(
            EntityKind::Redemptions,
            redemptions_titled(&["X", "Y", "X", "Z", "Y", "X", "Y"]),
        );
    let (aggregator, _) = aggregator(source);
    let snapshot = aggregator.aggregate().await;

    assert_eq!(snapshot.categories.get("Fashion"), Some(2));
    assert_eq!(snapshot.categories.get("Other"), Some(1));
    assert_eq!(snapshot.categories.entries().len(), 2);

    assert_eq!(
        snapshot.top_offers,
        vec![
            RankedEntry {
                title: "X".into(),
                count: 3,
                rank: 1
            },
            RankedEntry {
                title: "Y".into(),
                count: 3,
                rank: 2
            },
            RankedEntry {
                title: "Z".into(),
                count: 1,
                rank: 3
            },
        ]
    );
}

#[tokio::test]
async fn test_top_offers_limit_follows_config() {
    let source = Arc::new(populated_source());
    let aggregator =
        MetricsAggregator::from_config(source, &DashboardConfig { top_offers: 1 });
    let snapshot = aggregator.aggregate().await;
    assert_eq!(snapshot.top_offers.len(), 1);
    assert_eq!(snapshot.top_offers[0].title, "Coffee");
}

#[test]
fn test_stacked_labels_first_non_empty() {
    let trends = TrendSet {
        users: TrendSeries::empty(),
        offers: series(&["Q1", "Q2"], &[1.0, 2.0]),
        redemptions: series(&["Jan"], &[3.0]),
    };
    assert_eq!(trends.stacked_labels(), &["Q1".to_string(), "Q2".to_string()]);
    assert!(TrendSet::default().stacked_labels().is_empty());
}
