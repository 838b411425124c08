//! Sticky endpoint discovery for offer administration
//!
//! Offer CRUD is served by one of several API surfaces depending on the
//! deployment. The resolver probes the candidates in order, remembers the
//! first one that answers, and keeps using it until a call against it fails.
//! The remembered endpoint lives on the resolver instance, so independent
//! resolvers (and tests) never share state.

use crate::core::config::{AdminConfig, AdminEndpoint};
use crate::core::{AnalyticsError, OfferRecord, RecordId, Result};
use crate::runtime::client::join_url;
use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Probes candidate endpoints and caches the one that works
#[derive(Debug)]
pub struct EndpointResolver {
    candidates: Vec<AdminEndpoint>,
    active: RwLock<Option<usize>>,
}

impl EndpointResolver {
    pub fn new(candidates: Vec<AdminEndpoint>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(AnalyticsError::configuration(
                "endpoint resolver needs at least one candidate",
            ));
        }
        Ok(Self {
            candidates,
            active: RwLock::new(None),
        })
    }

    pub fn candidates(&self) -> &[AdminEndpoint] {
        &self.candidates
    }

    /// Currently remembered endpoint, if any
    pub fn active(&self) -> Option<AdminEndpoint> {
        let active = *self.active.read();
        active.map(|idx| self.candidates[idx].clone())
    }

    pub fn clear(&self) {
        *self.active.write() = None;
    }

    /// Target for write operations: the active endpoint, else the first
    /// candidate. Writes never update the cache; the next read re-probes.
    pub fn write_target(&self) -> AdminEndpoint {
        self.active()
            .unwrap_or_else(|| self.candidates[0].clone())
    }

    /// Run `fetch` against the active endpoint, falling back to probing
    /// every candidate in order. Returns the endpoint that answered.
    pub async fn resolve_and_fetch<T, F, Fut>(&self, mut fetch: F) -> Result<(AdminEndpoint, T)>
    where
        F: FnMut(AdminEndpoint) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let active = *self.active.read();
        if let Some(idx) = active {
            let endpoint = self.candidates[idx].clone();
            match fetch(endpoint.clone()).await {
                Ok(payload) => return Ok((endpoint, payload)),
                Err(e) => {
                    warn!(endpoint = %endpoint.path, error = %e, "active endpoint failed, re-probing");
                    self.clear();
                }
            }
        }

        for (idx, endpoint) in self.candidates.iter().enumerate() {
            match fetch(endpoint.clone()).await {
                Ok(payload) => {
                    info!(endpoint = %endpoint.path, "endpoint resolved");
                    *self.active.write() = Some(idx);
                    return Ok((endpoint.clone(), payload));
                }
                Err(e) => {
                    debug!(endpoint = %endpoint.path, error = %e, "candidate failed");
                }
            }
        }

        Err(AnalyticsError::NoWorkingEndpoint)
    }
}

/// Fields an administrator fills in to create an offer
#[derive(Debug, Clone, Default)]
pub struct OfferDraft {
    pub title: String,
    /// Blank means the offer applies to all categories
    pub category: String,
    pub description: String,
    pub cost_points: i64,
    pub image_url: String,
    /// Blank means all tiers
    pub tier_level: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOfferPayload {
    pub title: String,
    pub category: Option<String>,
    pub description: String,
    pub cost_points: i64,
    pub image_url: String,
    pub tier_level: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub active: bool,
}

impl OfferDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(AnalyticsError::invalid_input("Title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(AnalyticsError::invalid_input("Description is required"));
        }
        if self.cost_points < 0 {
            return Err(AnalyticsError::invalid_input(
                "Cost points must be a non-negative number",
            ));
        }
        Ok(())
    }

    /// Validate and normalize into the wire payload. New offers are
    /// published immediately.
    pub fn into_payload(self) -> Result<NewOfferPayload> {
        self.validate()?;
        Ok(NewOfferPayload {
            title: self.title,
            category: non_blank(self.category),
            description: self.description,
            cost_points: self.cost_points,
            image_url: self.image_url,
            tier_level: non_blank(self.tier_level),
            start_date: self.start_date,
            end_date: self.end_date,
            active: true,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Offer CRUD over whichever admin surface the deployment exposes
#[derive(Debug)]
pub struct OfferAdminClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    resolver: EndpointResolver,
}

impl OfferAdminClient {
    pub fn new(config: &AdminConfig, auth_token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth_token,
            resolver: EndpointResolver::new(config.endpoints.clone())?,
        })
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Transport and status failures become [`AnalyticsError::OfferWriteFailed`]
    async fn send_write(
        &self,
        action: &str,
        endpoint: &AdminEndpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<()> {
        let outcome = match self.authorize(request).send().await {
            Ok(response) => response.error_for_status().map(|_| ()),
            Err(e) => Err(e),
        };
        outcome.map_err(|e| {
            warn!(endpoint = %endpoint.path, action, error = %e, "offer write failed");
            AnalyticsError::offer_write_failed(action, endpoint.path.clone(), e)
        })
    }

    fn item_path(endpoint: &AdminEndpoint, id: &RecordId) -> String {
        format!("{}/{}", endpoint.path.trim_end_matches('/'), id)
    }

    /// List offers, discovering the endpoint if needed
    pub async fn list(&self) -> Result<Vec<OfferRecord>> {
        let (_, offers) = self
            .resolver
            .resolve_and_fetch(|endpoint| async move {
                let url = join_url(&self.base_url, &endpoint.path)?;
                let response = self
                    .authorize(self.http.get(url))
                    .send()
                    .await?
                    .error_for_status()?;
                Ok::<_, AnalyticsError>(response.json::<Vec<OfferRecord>>().await?)
            })
            .await?;
        Ok(offers)
    }

    pub async fn create(&self, draft: OfferDraft) -> Result<()> {
        let payload = draft.into_payload()?;
        let endpoint = self.resolver.write_target();
        let url = join_url(&self.base_url, &endpoint.path)?;
        debug!(%url, title = %payload.title, "creating offer");
        self.send_write("create", &endpoint, self.http.post(url).json(&payload))
            .await
    }

    /// Flip an offer's published state
    pub async fn toggle(&self, id: &RecordId) -> Result<()> {
        let endpoint = self.resolver.write_target();
        let mut path = Self::item_path(&endpoint, id);
        if let Some(suffix) = &endpoint.toggle_suffix {
            path = format!("{}/{}", path, suffix.trim_matches('/'));
        }
        let url = join_url(&self.base_url, &path)?;
        debug!(%url, "toggling offer");
        self.send_write("toggle", &endpoint, self.http.put(url)).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let endpoint = self.resolver.write_target();
        let url = join_url(&self.base_url, &Self::item_path(&endpoint, id))?;
        debug!(%url, "deleting offer");
        self.send_write("delete", &endpoint, self.http.delete(url)).await
    }
}
