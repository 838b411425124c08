use crate::cli::commands::{ConfigAction, DashboardCommand, ExportCommand, OffersAction};
use crate::core::{Config, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;
use tracing::debug;

/// Reward360 analytics dashboard, report export and offer administration
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gateway base URL for the data service and the admin endpoints
    #[arg(long, global = true, env = "REWARD360_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "REWARD360_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate and render the analytics dashboard
    Dashboard(DashboardCommand),

    /// Export a history dataset as CSV, Excel or PDF
    Export(ExportCommand),

    /// Administer the offer catalog
    Offers {
        #[command(subcommand)]
        action: OffersAction,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// The config file in use: `--config` or the per-user default
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::cli::default_config_path)
    }

    /// Load the config file (defaults when absent) and apply the global flags
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        let config = if path.exists() {
            debug!(path = %path.display(), "loading configuration");
            Config::load_from_file(&path)?
        } else {
            Config::default()
        };
        Ok(config.merge_with_cli_args(self))
    }

    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let quiet = self.quiet;
        let config_path = self.config_path();

        match &self.command {
            Commands::Completion { shell } => {
                generate_completion(*shell);
                return Ok(());
            }
            // Must work even when the existing file no longer parses
            Commands::Config {
                action: action @ ConfigAction::Init { .. },
            } => return action.execute(&config_path, &Config::default()),
            _ => {}
        }

        let config = self.load_config()?;
        match self.command {
            Commands::Dashboard(cmd) => cmd.execute(&config, quiet).await,
            Commands::Export(cmd) => cmd.execute(&config, quiet).await,
            Commands::Offers { action } => action.execute(&config, quiet).await,
            Commands::Config { action } => action.execute(&config_path, &config),
            Commands::Completion { .. } => Ok(()),
        }
    }
}

/// Generate shell completion script
fn generate_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
