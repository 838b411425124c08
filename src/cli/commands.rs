use crate::analytics::{ExportFormat, MetricsAggregator, ReportExporter, StatusMessage};
use crate::cli::output;
use crate::core::{AnalyticsError, Config, EntityKind, RecordId, Result};
use crate::runtime::{HttpDataSource, OfferAdminClient, OfferDraft};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Render the dashboard from one aggregation pass
#[derive(Args, Debug)]
pub struct DashboardCommand {
    /// Print the snapshot as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

impl DashboardCommand {
    pub async fn execute(&self, config: &Config, quiet: bool) -> Result<()> {
        let source = Arc::new(HttpDataSource::new(config.data_service.clone())?);
        let snapshot = MetricsAggregator::from_config(source, &config.dashboard)
            .aggregate()
            .await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else if !quiet {
            output::render_dashboard(&snapshot);
        }

        // The snapshot is rendered either way; a KPI failure still fails the command
        match snapshot.escalation() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Export one history dataset to a file
#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Dataset: users, offers, redemptions or reports
    #[arg(value_parser = parse_entity)]
    pub entity: EntityKind,

    /// Output format: csv, excel or pdf
    #[arg(short, long, value_parser = parse_format)]
    pub format: ExportFormat,

    /// Directory to write into (overrides `export.output_dir`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl ExportCommand {
    pub async fn execute(&self, config: &Config, quiet: bool) -> Result<()> {
        let mut export_config = config.export.clone();
        if let Some(dir) = &self.output_dir {
            export_config.output_dir = dir.clone();
        }

        let source = Arc::new(HttpDataSource::new(config.data_service.clone())?);
        let exporter = ReportExporter::new(source, export_config);
        let outcome = exporter.save(self.entity, self.format).await;

        let banner = StatusMessage::for_export(self.entity, self.format, &outcome);
        if !quiet || banner.is_error() {
            output::print_status(&banner);
        }

        match outcome {
            Ok(path) => {
                if !quiet {
                    println!("{}", path.display());
                }
                Ok(())
            }
            // The banner already told the user
            Err(err) if err.is_non_fatal() => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum OffersAction {
    /// List every offer
    List {
        /// Print the offers as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create and publish an offer
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        cost_points: i64,

        /// Leave empty for all categories
        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, default_value = "")]
        image_url: String,

        /// Leave empty for all tiers
        #[arg(long, default_value = "")]
        tier_level: String,

        #[arg(long, default_value = "")]
        start_date: String,

        #[arg(long, default_value = "")]
        end_date: String,
    },

    /// Flip an offer between published and hidden
    Toggle {
        /// Offer ID
        id: String,
    },

    /// Delete an offer
    Delete {
        /// Offer ID
        id: String,
    },
}

impl OffersAction {
    pub async fn execute(&self, config: &Config, quiet: bool) -> Result<()> {
        let client = OfferAdminClient::new(
            &config.admin,
            config.data_service.auth_token.clone(),
            config.data_service.timeout_secs,
        )?;

        match self {
            OffersAction::List { json } => {
                let offers = client.list().await?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&offers)?);
                } else if !quiet {
                    output::render_offers(&offers);
                }
            }
            OffersAction::Create {
                title,
                description,
                cost_points,
                category,
                image_url,
                tier_level,
                start_date,
                end_date,
            } => {
                let draft = OfferDraft {
                    title: title.clone(),
                    category: category.clone(),
                    description: description.clone(),
                    cost_points: *cost_points,
                    image_url: image_url.clone(),
                    tier_level: tier_level.clone(),
                    start_date: start_date.clone(),
                    end_date: end_date.clone(),
                };
                client.create(draft).await?;
                info!(title = %title, "offer created");
                if !quiet {
                    output::print_success(&format!("Offer '{}' created", title));
                }
            }
            OffersAction::Toggle { id } => {
                client.toggle(&record_id(id)).await?;
                if !quiet {
                    output::print_success(&format!("Offer {} toggled", id));
                }
            }
            OffersAction::Delete { id } => {
                client.delete(&record_id(id)).await?;
                if !quiet {
                    output::print_success(&format!("Offer {} deleted", id));
                }
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,
}

impl ConfigAction {
    pub fn execute(&self, path: &Path, config: &Config) -> Result<()> {
        match self {
            ConfigAction::Show => {
                let mut shown = config.clone();
                if shown.data_service.auth_token.is_some() {
                    shown.data_service.auth_token = Some("********".to_string());
                }
                let content = toml::to_string_pretty(&shown).map_err(|e| {
                    AnalyticsError::configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("{}", content);
            }
            ConfigAction::Init { force } => {
                if path.exists() && !force {
                    return Err(AnalyticsError::invalid_input(format!(
                        "{} already exists; pass --force to overwrite it",
                        path.display()
                    )));
                }
                Config::default().save_to_file(path)?;
                output::print_success(&format!("Wrote {}", path.display()));
            }
            ConfigAction::Path => println!("{}", path.display()),
        }
        Ok(())
    }
}

/// Numeric IDs come from the relational services, anything else from the document store
pub(crate) fn record_id(raw: &str) -> RecordId {
    raw.parse::<i64>()
        .map(RecordId::Number)
        .unwrap_or_else(|_| RecordId::Text(raw.to_string()))
}

fn parse_entity(raw: &str) -> std::result::Result<EntityKind, String> {
    raw.parse::<EntityKind>().map_err(|e| e.user_message())
}

fn parse_format(raw: &str) -> std::result::Result<ExportFormat, String> {
    raw.parse::<ExportFormat>().map_err(|e| e.user_message())
}
