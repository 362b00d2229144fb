#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for computing dashboard overviews from a JSON dataset.
//!
//! Loads reference tables and records from `--data`, applies the
//! `field__comparator=value` filters given after the subcommand, and prints
//! the overview as JSON.
//!
//! ```text
//! cfs_summary --data dataset.json calls time_received__gte=2015-01-01
//! cfs_summary --data dataset.json --config summary.toml activity call_unit=7
//! ```

mod dataset;
mod params;

use std::path::PathBuf;

use cfs_summary::{CallVolumeOverview, OfficerActivityOverview, SummaryConfig};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::dataset::Dataset;

#[derive(Parser)]
#[command(name = "cfs_summary", about = "Calls-for-service overview tool")]
struct Cli {
    /// JSON dataset with reference tables and records
    #[arg(long)]
    data: PathBuf,

    /// TOML file overriding granularity thresholds and allocation bin width
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call volume over time, weekday/hour heatmap, and per-beat breakdowns
    Calls {
        /// Filters such as `time_received__gte=2015-01-01` or `beat=3`
        filters: Vec<String>,
    },
    /// Officer time allocation and on-duty rates by beat and district
    Activity {
        /// Filters such as `time__lt=2015-02-01` or `call_unit=7`
        filters: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SummaryConfig::load(path)?,
        None => SummaryConfig::default(),
    };

    let dataset = Dataset::load(&cli.data)?;
    let references = dataset.references()?;

    let output = match &cli.command {
        Commands::Calls { filters } => {
            let predicates = params::parse_filters(filters)?;
            let calls = dataset.calls()?;
            let overview =
                CallVolumeOverview::from_source(&calls, predicates, &references, &config)?;
            log::info!("Call volume bucketed by {:?}", overview.granularity());
            render(&overview.to_dict(), cli.compact)?
        }
        Commands::Activity { filters } => {
            let predicates = params::parse_filters(filters)?;
            let activities = dataset.officer_activities()?;
            let overview =
                OfficerActivityOverview::from_source(&activities, predicates, &references, &config)?;
            render(&overview.to_dict(), cli.compact)?
        }
    };

    println!("{output}");
    Ok(())
}

fn render<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}
