use crate::core::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration settings for the analytics pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analytics data service connection
    #[serde(default)]
    pub data_service: DataServiceConfig,

    /// Offer administration endpoints
    #[serde(default)]
    pub admin: AdminConfig,

    /// Export encoder settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Dashboard aggregation settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Analytics data service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token forwarded to the gateway
    pub auth_token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    pub kpis_path: String,

    /// `{metric}` is replaced by `users`, `offers` or `redemptions`
    pub trend_path: String,

    /// `{entity}` is replaced by the dataset name
    pub history_path: String,

    /// `{metric}` is replaced by the dataset name
    pub generate_report_path: String,
}

/// One candidate CRUD surface for offer administration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEndpoint {
    pub path: String,

    /// Publish toggles go to `{path}/{id}/{suffix}` when set, else `{path}/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Probed in order; the first one that answers becomes sticky
    pub endpoints: Vec<AdminEndpoint>,
}

/// Quoting policy of the delimited-text encoder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvQuoting {
    /// Cells are written verbatim; byte-compatible with historic exports
    #[default]
    Never,
    /// RFC 4180 quoting for cells containing the delimiter, quotes or newlines
    Necessary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default)]
    pub csv_quoting: CsvQuoting,

    /// Offset applied when rendering zoned instants
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// chrono format string for rendered timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    #[serde(default = "default_brand")]
    pub brand: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Length of the top redeemed offers leaderboard
    #[serde(default = "default_top_offers")]
    pub top_offers: usize,
}

impl Default for DataServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            timeout_secs: default_timeout(),
            kpis_path: "/analytics/kpis".to_string(),
            trend_path: "/analytics/trends/{metric}".to_string(),
            history_path: "/analytics/history/{entity}".to_string(),
            generate_report_path: "/analytics/reports/{metric}".to_string(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: vec![
                AdminEndpoint {
                    path: "/admin/offers".to_string(),
                    toggle_suffix: Some("toggle".to_string()),
                },
                AdminEndpoint {
                    path: "/api/promotions/promotions".to_string(),
                    toggle_suffix: None,
                },
            ],
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delimiter: default_delimiter(),
            csv_quoting: CsvQuoting::default(),
            utc_offset_minutes: 0,
            timestamp_format: default_timestamp_format(),
            brand: default_brand(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_offers: default_top_offers(),
        }
    }
}

impl Config {
    /// Load configuration from file, with fallback to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AnalyticsError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            AnalyticsError::configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the encoders and resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.admin.endpoints.is_empty() {
            return Err(AnalyticsError::configuration(
                "admin.endpoints must list at least one candidate",
            ));
        }
        if !self.export.delimiter.is_ascii() {
            return Err(AnalyticsError::configuration(format!(
                "export.delimiter must be a single ASCII character, got '{}'",
                self.export.delimiter
            )));
        }
        if self.dashboard.top_offers == 0 {
            return Err(AnalyticsError::configuration(
                "dashboard.top_offers must be at least 1",
            ));
        }
        Ok(())
    }

    /// Point both the data service and the admin surfaces at one gateway
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.data_service.base_url = base_url.clone();
        self.admin.base_url = base_url;
        self
    }

    /// Apply the global command line flags on top of the file settings
    #[cfg(feature = "cli")]
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::Cli) -> Self {
        // CLI args override config file settings
        if let Some(ref api_url) = cli_args.api_url {
            self = self.with_base_url(api_url.clone());
        }
        if let Some(ref token) = cli_args.token {
            self.data_service.auth_token = Some(token.clone());
        }
        self
    }
}

// Helper functions for default values
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_delimiter() -> char {
    ','
}

fn default_timestamp_format() -> String {
    "%-m/%-d/%Y, %-I:%M:%S %p".to_string()
}

fn default_brand() -> String {
    "Reward360".to_string()
}

fn default_top_offers() -> usize {
    5
}
