mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use socialdash_core::ComparisonMode;
use tracing_subscriber::EnvFilter;

use crate::commands::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "socialdash-cli")]
#[command(about = "Dashboard metrics and insights from snapshot files")]
struct Cli {
    /// Print the JSON payload instead of a text table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Headline counts, CTR and moderation totals
    Summary {
        /// Snapshot file (.json, .yaml or .yml)
        #[arg(long)]
        file: PathBuf,
    },
    /// Ad ROI per period, per ad, or aggregated
    Roi {
        #[arg(long)]
        file: PathBuf,
        /// Only rows for this ad
        #[arg(long)]
        ad_id: Option<String>,
        /// Inclusive lower date bound (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Inclusive upper date bound (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Group rows by ad instead of listing periods
        #[arg(long)]
        by_ad: bool,
    },
    /// High/medium/low satisfaction distribution
    Satisfaction {
        #[arg(long)]
        file: PathBuf,
    },
    /// Ranked insights
    Insights {
        #[arg(long)]
        file: PathBuf,
        /// Comparison mode: endpoints or latest (defaults to SOCIALDASH_TREND_MODE)
        #[arg(long)]
        mode: Option<ComparisonMode>,
    },
    /// Full dashboard report
    Report {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        mode: Option<ComparisonMode>,
    },
    /// Classify the change between two values
    #[command(allow_negative_numbers = true)]
    Trend { previous: f64, current: f64 },
}

fn main() -> anyhow::Result<()> {
    let config = socialdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Some(Commands::Summary { file }) => commands::run_summary(&file, format)?,
        Some(Commands::Roi {
            file,
            ad_id,
            start_date,
            end_date,
            by_ad,
        }) => commands::run_roi(
            &file,
            commands::roi_filter(ad_id, start_date, end_date)?,
            by_ad,
            format,
        )?,
        Some(Commands::Satisfaction { file }) => commands::run_satisfaction(&file, format)?,
        Some(Commands::Insights { file, mode }) => {
            commands::run_insights(&file, mode.unwrap_or(config.trend_mode), format)?;
        }
        Some(Commands::Report { file, mode }) => {
            commands::run_report(&file, mode.unwrap_or(config.trend_mode), format)?;
        }
        Some(Commands::Trend { previous, current }) => {
            commands::run_trend(previous, current, format)?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}
