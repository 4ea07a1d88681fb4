//! keymagic CLI entrypoint.

use clap::Parser;
use keymagic_licensing::LicenseAction;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

use commands::{Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "keymagic")]
#[command(author, version, about = "License key management for EDD Software Licensing stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load().unwrap_or_default();

    match cli.command {
        Commands::Status { json } => handlers::status(&config, json).await?,
        Commands::SetKey { key } => handlers::set_key(&config, &key).await?,
        Commands::Activate => handlers::manage(&config, LicenseAction::Activate).await?,
        Commands::Deactivate => handlers::manage(&config, LicenseAction::Deactivate).await?,
        Commands::Check => handlers::check(&config).await?,
        Commands::UpdateCheck => handlers::update_check(&config).await?,
        Commands::Watch => handlers::watch(&config).await?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
