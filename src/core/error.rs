use crate::core::types::EntityKind;
use thiserror::Error;

/// Error taxonomy for the analytics and export pipeline
///
/// Transport and IO failures are converted into this type at the orchestration
/// boundary (aggregator, exporter, endpoint resolver); nothing below the
/// presentation layer sees a raw `reqwest::Error`.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Data source '{origin}' unavailable: {message}")]
    SourceUnavailable { origin: String, message: String },

    #[error("Failed to load analytics data: {0}")]
    AllSourcesUnavailable(String),

    #[error("No {0} data available to export.")]
    NoExportData(EntityKind),

    #[error("Invalid entity kind: {0}")]
    InvalidEntityKind(String),

    #[error("Failed to load offers: no working API endpoint found")]
    NoWorkingEndpoint,

    #[error("Failed to {action} offer via '{endpoint}': {message}")]
    OfferWriteFailed {
        action: String,
        endpoint: String,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Row has {actual} cells but the header has {expected} columns")]
    RowWidth { expected: usize, actual: usize },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Async task error: {0}")]
    AsyncTask(#[from] tokio::task::JoinError),
}

impl AnalyticsError {
    /// Create a source-unavailable error for one aggregation input
    pub fn source_unavailable<S: Into<String>, M: ToString>(origin: S, message: M) -> Self {
        Self::SourceUnavailable {
            origin: origin.into(),
            message: message.to_string(),
        }
    }

    /// Create an offer write error for the endpoint that rejected it
    pub fn offer_write_failed<A, E, M>(action: A, endpoint: E, message: M) -> Self
    where
        A: Into<String>,
        E: Into<String>,
        M: ToString,
    {
        Self::OfferWriteFailed {
            action: action.into(),
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Create an escalated aggregation error
    pub fn all_sources_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::AllSourcesUnavailable(msg.into())
    }

    /// Create an invalid entity kind error
    pub fn invalid_entity_kind<S: Into<String>>(kind: S) -> Self {
        Self::InvalidEntityKind(kind.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an export error
    pub fn export<S: Into<String>>(msg: S) -> Self {
        Self::Export(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. }
                | Self::OfferWriteFailed { .. }
                | Self::Http(_)
                | Self::Io(_)
                | Self::AsyncTask(_)
        )
    }

    /// Errors that surface as a message to the user rather than a failure
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoExportData(_) | Self::NoWorkingEndpoint | Self::SourceUnavailable { .. }
        )
    }

    /// Get the banner text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::AllSourcesUnavailable(_) => "Failed to load analytics data.".to_string(),
            Self::NoWorkingEndpoint => {
                "Failed to load offers: no working API endpoint found. Check the admin endpoints in your config file.".to_string()
            }
            Self::Http(err) => {
                format!(
                    "Data service error: {}. Check your network connection and the configured API URL.",
                    err
                )
            }
            Self::InvalidEntityKind(kind) => {
                format!(
                    "Unknown dataset '{}'. Expected one of: users, offers, redemptions, reports.",
                    kind
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Convenient result type for the analytics pipeline
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_creation_helpers() {
        match AnalyticsError::source_unavailable("trend:users", "connection refused") {
            AnalyticsError::SourceUnavailable { origin, message } => {
                assert_eq!(origin, "trend:users");
                assert_eq!(message, "connection refused");
            }
            _ => panic!("Expected SourceUnavailable error"),
        }

        match AnalyticsError::invalid_entity_kind("coupons") {
            AnalyticsError::InvalidEntityKind(kind) => assert_eq!(kind, "coupons"),
            _ => panic!("Expected InvalidEntityKind error"),
        }

        match AnalyticsError::invalid_input("Title is required") {
            AnalyticsError::InvalidInput(msg) => assert_eq!(msg, "Title is required"),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_no_export_data_message_is_literal() {
        let err = AnalyticsError::NoExportData(EntityKind::Redemptions);
        assert_eq!(err.to_string(), "No redemptions data available to export.");
        assert_eq!(err.user_message(), "No redemptions data available to export.");
    }

    #[test]
    fn test_non_fatal_classification() {
        assert!(AnalyticsError::NoExportData(EntityKind::Users).is_non_fatal());
        assert!(AnalyticsError::NoWorkingEndpoint.is_non_fatal());
        assert!(AnalyticsError::source_unavailable("kpis", "down").is_non_fatal());

        assert!(!AnalyticsError::all_sources_unavailable("kpis down").is_non_fatal());
        assert!(!AnalyticsError::invalid_entity_kind("x").is_non_fatal());
        assert!(!AnalyticsError::offer_write_failed("delete", "/admin/offers", "500").is_non_fatal());
    }

    #[test]
    fn test_offer_write_failed_display() {
        let err = AnalyticsError::offer_write_failed("toggle", "/admin/offers", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "Failed to toggle offer via '/admin/offers': HTTP 500"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_retry_logic() {
        let io_err =
            AnalyticsError::Io(io::Error::new(io::ErrorKind::TimedOut, "Network timeout"));
        assert!(io_err.is_retryable());
        assert!(AnalyticsError::source_unavailable("history:offers", "503").is_retryable());

        assert!(!AnalyticsError::invalid_input("Bad arguments").is_retryable());
        assert!(!AnalyticsError::NoWorkingEndpoint.is_retryable());
    }

    #[test]
    fn test_user_friendly_error_messages() {
        let escalated = AnalyticsError::all_sources_unavailable("kpis: 500");
        assert_eq!(escalated.user_message(), "Failed to load analytics data.");

        let message = AnalyticsError::NoWorkingEndpoint.user_message();
        assert!(message.contains("no working API endpoint found"));

        let message = AnalyticsError::invalid_entity_kind("coupons").user_message();
        assert!(message.contains("coupons"));
        assert!(message.contains("redemptions"));

        // Generic error should fall back to Display
        let generic_err = AnalyticsError::configuration("Invalid config");
        assert_eq!(generic_err.user_message(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_error_type_conversions() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: AnalyticsError = io_error.into();
        assert!(matches!(err, AnalyticsError::Io(_)));

        let json_error = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: AnalyticsError = json_error.into();
        assert!(matches!(err, AnalyticsError::Serialization(_)));

        let url_error = url::Url::parse("not a url").unwrap_err();
        let err: AnalyticsError = url_error.into();
        assert!(matches!(err, AnalyticsError::Url(_)));
    }

    #[test]
    fn test_row_width_display() {
        let err = AnalyticsError::RowWidth {
            expected: 5,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Row has 3 cells but the header has 5 columns"
        );
    }
}
