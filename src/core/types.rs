//! Domain types shared by the aggregation and export pipeline
//!
//! History records are deserialized straight from the data service's JSON.
//! Every field is optional on the wire: the service omits or nulls fields
//! freely, and normalization happens later in one place (see
//! [`safe_cell`](crate::analytics::tabular::safe_cell)).

use crate::core::error::{AnalyticsError, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four exportable datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Users,
    Offers,
    Redemptions,
    Reports,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Users,
        EntityKind::Offers,
        EntityKind::Redemptions,
        EntityKind::Reports,
    ];

    /// Lowercase identifier used in URLs and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Offers => "offers",
            EntityKind::Redemptions => "redemptions",
            EntityKind::Reports => "reports",
        }
    }

    /// Capitalized form, e.g. `"Users"`
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Users => "Users",
            EntityKind::Offers => "Offers",
            EntityKind::Redemptions => "Redemptions",
            EntityKind::Reports => "Reports",
        }
    }

    /// Metric whose report generation is triggered before an export.
    /// `Reports` is the generated-report log itself and has none.
    pub fn trend_metric(&self) -> Option<TrendMetric> {
        match self {
            EntityKind::Users => Some(TrendMetric::Users),
            EntityKind::Offers => Some(TrendMetric::Offers),
            EntityKind::Redemptions => Some(TrendMetric::Redemptions),
            EntityKind::Reports => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "users" => Ok(EntityKind::Users),
            "offers" => Ok(EntityKind::Offers),
            "redemptions" => Ok(EntityKind::Redemptions),
            "reports" => Ok(EntityKind::Reports),
            _ => Err(AnalyticsError::invalid_entity_kind(s)),
        }
    }
}

/// Metrics that have a trend series and a KPI count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMetric {
    Users,
    Offers,
    Redemptions,
}

impl TrendMetric {
    pub const ALL: [TrendMetric; 3] = [
        TrendMetric::Users,
        TrendMetric::Offers,
        TrendMetric::Redemptions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendMetric::Users => "users",
            TrendMetric::Offers => "offers",
            TrendMetric::Redemptions => "redemptions",
        }
    }
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiSet {
    pub users: u64,
    pub offers: u64,
    pub redemptions: u64,
}

impl KpiSet {
    /// Label/value pairs in the order the comparison chart draws them
    pub fn as_series(&self) -> [(&'static str, u64); 3] {
        [
            ("Users", self.users),
            ("Offers", self.offers),
            ("Redemptions", self.redemptions),
        ]
    }
}

/// Time-bucketed values for one metric.
///
/// `labels` and `data` always have the same length; payloads that violate
/// this are rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrendSeries")]
pub struct TrendSeries {
    labels: Vec<String>,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTrendSeries {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    data: Vec<f64>,
}

impl TryFrom<RawTrendSeries> for TrendSeries {
    type Error = AnalyticsError;

    fn try_from(raw: RawTrendSeries) -> Result<Self> {
        TrendSeries::new(raw.labels, raw.data)
    }
}

impl TrendSeries {
    pub fn new(labels: Vec<String>, data: Vec<f64>) -> Result<Self> {
        if labels.len() != data.len() {
            return Err(AnalyticsError::invalid_input(format!(
                "trend series has {} labels but {} data points",
                labels.len(),
                data.len()
            )));
        }
        Ok(Self { labels, data })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Identifier as sent by the services: numeric in the relational services,
/// string in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// Any JSON scalar; objects and arrays land in `Other`
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
    Other(IgnoredAny),
}

/// Phone numbers and transaction codes arrive as strings or numbers
/// depending on the service; either way they are kept as text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(|value| match value {
        Scalar::Text(s) => Some(s),
        Scalar::Integer(n) => Some(n.to_string()),
        Scalar::Float(f) => Some(f.to_string()),
        Scalar::Flag(b) => Some(b.to_string()),
        Scalar::Other(_) => None,
    }))
}

/// Point costs sent as numeric strings or floats still count
fn lenient_points<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(|value| match value {
        Scalar::Integer(n) => Some(n),
        Scalar::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Scalar::Text(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_points")]
    pub cost_points: Option<i64>,
    pub active: Option<bool>,
    pub start_date: Option<String>,
    pub tier_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedemptionRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub confirmation_code: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub transaction_id: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_points")]
    pub cost_points: Option<i64>,
    pub offer_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRecord {
    pub id: Option<RecordId>,
    pub metric: Option<String>,
    pub generated_at: Option<String>,
}

/// One historical record, tagged with the dataset it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entityKind", rename_all = "lowercase")]
pub enum HistoryRecord {
    User(UserRecord),
    Offer(OfferRecord),
    Redemption(RedemptionRecord),
    Report(ReportRecord),
}

impl HistoryRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            HistoryRecord::User(_) => EntityKind::Users,
            HistoryRecord::Offer(_) => EntityKind::Offers,
            HistoryRecord::Redemption(_) => EntityKind::Redemptions,
            HistoryRecord::Report(_) => EntityKind::Reports,
        }
    }

    /// Decode a history payload. The discriminator comes from the endpoint
    /// that served it, not from the JSON body.
    pub fn decode_all(kind: EntityKind, payload: serde_json::Value) -> Result<Vec<HistoryRecord>> {
        let records = match kind {
            EntityKind::Users => serde_json::from_value::<Vec<UserRecord>>(payload)?
                .into_iter()
                .map(HistoryRecord::User)
                .collect(),
            EntityKind::Offers => serde_json::from_value::<Vec<OfferRecord>>(payload)?
                .into_iter()
                .map(HistoryRecord::Offer)
                .collect(),
            EntityKind::Redemptions => serde_json::from_value::<Vec<RedemptionRecord>>(payload)?
                .into_iter()
                .map(HistoryRecord::Redemption)
                .collect(),
            EntityKind::Reports => serde_json::from_value::<Vec<ReportRecord>>(payload)?
                .into_iter()
                .map(HistoryRecord::Report)
                .collect(),
        };
        Ok(records)
    }

    pub fn as_offer(&self) -> Option<&OfferRecord> {
        match self {
            HistoryRecord::Offer(offer) => Some(offer),
            _ => None,
        }
    }

    pub fn as_redemption(&self) -> Option<&RedemptionRecord> {
        match self {
            HistoryRecord::Redemption(redemption) => Some(redemption),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("users".parse::<EntityKind>().unwrap(), EntityKind::Users);
        assert_eq!(" Offers ".parse::<EntityKind>().unwrap(), EntityKind::Offers);
        assert_eq!("REPORTS".parse::<EntityKind>().unwrap(), EntityKind::Reports);

        let err = "coupons".parse::<EntityKind>().unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidEntityKind(ref k) if k == "coupons"));
    }

    #[test]
    fn test_reports_has_no_trend_metric() {
        assert_eq!(EntityKind::Reports.trend_metric(), None);
        assert_eq!(EntityKind::Offers.trend_metric(), Some(TrendMetric::Offers));
    }

    #[test]
    fn test_trend_series_rejects_mismatched_lengths() {
        let ok: TrendSeries =
            serde_json::from_value(json!({"labels": ["Jan", "Feb"], "data": [3, 5]})).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.data(), &[3.0, 5.0]);

        let bad = serde_json::from_value::<TrendSeries>(json!({"labels": ["Jan"], "data": [1, 2]}));
        assert!(bad.is_err());

        let missing: TrendSeries = serde_json::from_value(json!({})).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_kpis_default_missing_fields() {
        let kpis: KpiSet = serde_json::from_value(json!({"users": 12})).unwrap();
        assert_eq!(
            kpis,
            KpiSet {
                users: 12,
                offers: 0,
                redemptions: 0
            }
        );
    }

    #[test]
    fn test_decode_offer_history_with_nulls() {
        let payload = json!([
            {"id": 7, "title": "Festive 15% Off", "category": null, "costPoints": 150, "active": true},
            {"title": "Movie Night", "tierLevel": "GOLD", "startDate": "2024-03-01"}
        ]);

        let records = HistoryRecord::decode_all(EntityKind::Offers, payload).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind() == EntityKind::Offers));

        let first = records[0].as_offer().unwrap();
        assert_eq!(first.id, Some(RecordId::Number(7)));
        assert_eq!(first.category, None);
        assert_eq!(first.cost_points, Some(150));

        let second = records[1].as_offer().unwrap();
        assert_eq!(second.tier_level.as_deref(), Some("GOLD"));
        assert_eq!(second.active, None);
    }

    #[test]
    fn test_decode_tolerates_numeric_identifiers() {
        let payload = json!([
            {"confirmationCode": 998877, "transactionId": 12345, "costPoints": "120", "offerTitle": "Spa Day"},
            {"transactionId": null, "costPoints": 75.0},
            {"transactionId": {"ref": "x"}, "costPoints": "n/a"}
        ]);
        let records = HistoryRecord::decode_all(EntityKind::Redemptions, payload).unwrap();
        assert_eq!(records.len(), 3);

        let first = records[0].as_redemption().unwrap();
        assert_eq!(first.transaction_id.as_deref(), Some("12345"));
        assert_eq!(first.confirmation_code.as_deref(), Some("998877"));
        assert_eq!(first.cost_points, Some(120));

        let second = records[1].as_redemption().unwrap();
        assert_eq!(second.transaction_id, None);
        assert_eq!(second.cost_points, Some(75));

        let third = records[2].as_redemption().unwrap();
        assert_eq!(third.transaction_id, None);
        assert_eq!(third.cost_points, None);

        let users = HistoryRecord::decode_all(
            EntityKind::Users,
            json!([{"name": "Asha", "phone": 9876543210_i64}]),
        )
        .unwrap();
        match &users[0] {
            HistoryRecord::User(u) => assert_eq!(u.phone.as_deref(), Some("9876543210")),
            other => panic!("Expected user record, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_report_ids() {
        let payload = json!([{"id": "65f0c1", "metric": "users"}, {"id": 3}]);
        let records = HistoryRecord::decode_all(EntityKind::Reports, payload).unwrap();
        match &records[0] {
            HistoryRecord::Report(r) => assert_eq!(r.id.as_ref().unwrap().to_string(), "65f0c1"),
            other => panic!("Expected report record, got {:?}", other),
        }
        match &records[1] {
            HistoryRecord::Report(r) => assert_eq!(r.id.as_ref().unwrap().to_string(), "3"),
            other => panic!("Expected report record, got {:?}", other),
        }
    }
}
