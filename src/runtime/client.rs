use crate::core::{
    AnalyticsError, DataServiceConfig, EntityKind, HistoryRecord, KpiSet, Result, TrendMetric,
    TrendSeries,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Read side of the analytics data service
///
/// Every call may fail independently; callers decide how a failure degrades.
/// Implementations must be shareable across the aggregation fan-out.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Headline counts
    async fn kpis(&self) -> Result<KpiSet>;

    /// Time-bucketed series for one metric
    async fn trend(&self, metric: TrendMetric) -> Result<TrendSeries>;

    /// Full history of one dataset
    async fn history(&self, kind: EntityKind) -> Result<Vec<HistoryRecord>>;

    /// Ask the service to record a generated report for `metric`
    async fn generate_report(&self, metric: TrendMetric) -> Result<()>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    async fn kpis(&self) -> Result<KpiSet> {
        (**self).kpis().await
    }

    async fn trend(&self, metric: TrendMetric) -> Result<TrendSeries> {
        (**self).trend(metric).await
    }

    async fn history(&self, kind: EntityKind) -> Result<Vec<HistoryRecord>> {
        (**self).history(kind).await
    }

    async fn generate_report(&self, metric: TrendMetric) -> Result<()> {
        (**self).generate_report(metric).await
    }
}

/// HTTP client for the analytics data service
///
/// # Examples
///
/// ```rust,no_run
/// # use reward360_analytics::runtime::{DataSource, HttpDataSource};
/// # async fn example() -> reward360_analytics::Result<()> {
/// let source = HttpDataSource::builder()
///     .base_url("http://localhost:8080")
///     .auth_token("eyJhbGciOi...")
///     .timeout_secs(10)
///     .build()?;
///
/// let kpis = source.kpis().await?;
/// println!("{} users", kpis.users);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    http: reqwest::Client,
    config: Arc<DataServiceConfig>,
}

impl HttpDataSource {
    /// Create a client from data service settings
    pub fn new(config: DataServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> HttpDataSourceBuilder {
        HttpDataSourceBuilder::new()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        join_url(&self.config.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "fetching");
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn kpis(&self) -> Result<KpiSet> {
        let url = self.endpoint(&self.config.kpis_path)?;
        self.get_json(url).await
    }

    async fn trend(&self, metric: TrendMetric) -> Result<TrendSeries> {
        let path = self.config.trend_path.replace("{metric}", metric.as_str());
        let url = self.endpoint(&path)?;
        self.get_json(url).await
    }

    async fn history(&self, kind: EntityKind) -> Result<Vec<HistoryRecord>> {
        let path = self.config.history_path.replace("{entity}", kind.as_str());
        let url = self.endpoint(&path)?;
        let payload: serde_json::Value = self.get_json(url).await?;

        // Some deployments answer an empty history with `null`
        if payload.is_null() {
            return Ok(Vec::new());
        }
        HistoryRecord::decode_all(kind, payload)
    }

    async fn generate_report(&self, metric: TrendMetric) -> Result<()> {
        let path = self
            .config
            .generate_report_path
            .replace("{metric}", metric.as_str());
        let url = self.endpoint(&path)?;
        debug!(%url, "triggering report generation");
        self.authorize(self.http.post(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Join a configured base URL and a path without dropping a base path prefix
pub(crate) fn join_url(base: &str, path: &str) -> Result<Url> {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        return Err(AnalyticsError::configuration("base URL is empty"));
    }
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{}/{}", base, path))?)
}

/// Builder for creating `HttpDataSource` instances with fluent configuration
pub struct HttpDataSourceBuilder {
    config: DataServiceConfig,
}

impl Default for HttpDataSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpDataSourceBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: DataServiceConfig::default(),
        }
    }

    /// Set the configuration directly
    pub fn config(mut self, config: DataServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the gateway base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the bearer token sent with every request
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpDataSource> {
        HttpDataSource::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source_for(server: &MockServer) -> HttpDataSource {
        HttpDataSource::builder()
            .base_url(server.uri())
            .timeout_secs(5)
            .build()
            .unwrap()
    }

    #[test]
    fn test_join_url_keeps_base_path() {
        let url = join_url("https://gw.example.com/api/", "/analytics/kpis").unwrap();
        assert_eq!(url.as_str(), "https://gw.example.com/api/analytics/kpis");

        assert!(join_url("", "/x").is_err());
    }

    #[tokio::test]
    async fn test_fetch_kpis_and_trend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analytics/kpis"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"users": 42, "offers": 7, "redemptions": 19})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/analytics/trends/offers"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"labels": ["Jan", "Feb"], "data": [2, 5]})),
            )
            .mount(&server)
            .await;

        let source = source_for(&server).await;

        let kpis = source.kpis().await.unwrap();
        assert_eq!(kpis.users, 42);
        assert_eq!(kpis.redemptions, 19);

        let trend = source.trend(TrendMetric::Offers).await.unwrap();
        assert_eq!(trend.labels(), &["Jan".to_string(), "Feb".to_string()]);
    }

    #[tokio::test]
    async fn test_history_decodes_by_endpoint_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analytics/history/redemptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"confirmationCode": "RC-1", "offerTitle": "Coffee", "costPoints": 50},
                {"confirmationCode": "RC-2"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/analytics/history/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
            .mount(&server)
            .await;

        let source = source_for(&server).await;

        let records = source.history(EntityKind::Redemptions).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].as_redemption().unwrap().offer_title.as_deref(),
            Some("Coffee")
        );

        let users = source.history(EntityKind::Users).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/analytics/kpis"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        let err = source.kpis().await.unwrap_err();
        assert!(matches!(err, AnalyticsError::Http(_)));
    }

    #[tokio::test]
    async fn test_generate_report_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analytics/reports/users"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpDataSource::builder()
            .base_url(server.uri())
            .auth_token("secret-token")
            .build()
            .unwrap();

        source.generate_report(TrendMetric::Users).await.unwrap();
    }
}
