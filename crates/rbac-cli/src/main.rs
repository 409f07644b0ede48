//! Security-policy migration for the platform resource hierarchy
//!
//! Walks organizations, workspaces and scenarios, writes a security policy
//! derived from resource ownership, and records every resource in a CSV
//! audit report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rbac_cli::commands::{check, migrate};
use rbac_cli::config::{finalize, load_config, DEFAULT_CONFIG_PATH};
use rbac_cli::logging;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "rbac-migrate")]
#[command(about = "Migrate resource ownership to explicit security policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the migration (default)
    Migrate {
        /// Migrate only this organization
        #[arg(short, long)]
        organization: Option<String>,
    },

    /// Validate the configuration and show what a run would do
    CheckConfig {
        /// Organization override to validate
        #[arg(short, long)]
        organization: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or(Commands::Migrate { organization: None });

    match command {
        Commands::CheckConfig { organization } => {
            let config = finalize(load_config(&cli.config)?, organization)?;
            print!("{}", check::describe(&config));
            println!("Configuration OK");
        }
        Commands::Migrate { organization } => {
            let config = finalize(load_config(&cli.config)?, organization)?;
            logging::init(cli.verbose, &config.report.log_file)?;
            info!(config = %cli.config.display(), "Configuration loaded");

            let summary = migrate::run(&config).await?;
            if summary.is_degraded() {
                warn!(summary = %summary, "Migration finished with degraded branches");
            }
            println!("{summary}");
        }
    }

    Ok(())
}
