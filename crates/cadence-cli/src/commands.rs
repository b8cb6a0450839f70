//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize job schedules in the given files or directories
    Run {
        /// YAML files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Report schedule violations without rewriting anything
    Check {
        /// YAML files or directories to process
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Classify a single schedule expression
    Classify {
        /// Cron expression, alias, or interval (quote cron strings)
        expr: String,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a commented default cadence.yaml
    Init,
}
