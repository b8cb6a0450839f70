//! Cadence CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod document;
mod handlers;
mod logs;


use commands::Commands;
use config::CadenceConfig;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(author, version, about = "Normalize periodic CI job schedules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            paths,
            config,
            dry_run,
        } => {
            let config = CadenceConfig::load(config.as_deref())?;
            handlers::run(&paths, &config, dry_run)?;
        }
        Commands::Check { paths, config } => {
            let config = CadenceConfig::load(config.as_deref())?;
            handlers::run(&paths, &config, true)?;
        }
        Commands::Classify { expr, config } => {
            let config = CadenceConfig::load(config.as_deref())?;
            handlers::classify_expr(&expr, &config);
        }
        Commands::Init => handlers::init()?,
    }
    Ok(())
}
