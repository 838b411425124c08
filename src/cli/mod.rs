//! Operator command line for the analytics pipeline.
//! ## Usage
//!
//! ```bash
//! # Render the dashboard
//! reward360-analytics dashboard
//!
//! # Export a dataset
//! reward360-analytics export offers --format pdf --output-dir ./reports
//!
//! # Administer offers
//! reward360-analytics offers list
//! reward360-analytics offers toggle 42
//!
//! # Write a default configuration file
//! reward360-analytics config init
//! ```

pub mod app;
pub mod commands;
pub mod output;


pub use app::{Cli, Commands};

/// Version information for the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the configuration file
pub fn default_config_path() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "reward360-analytics")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("config.toml")
}
