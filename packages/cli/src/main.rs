#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line explorer for Mexican energy permit statistics.
//!
//! Loads a permit spreadsheet together with a boundary set (Gerencias de
//! Control Regional or entidades federativas), attributes each permit to
//! its region and prints totals, category breakdowns and region ×
//! category matrices. Without a subcommand an interactive menu runs.
//!
//! Uses `indicatif-log-bridge` (via [`energy_map_cli_utils::init_logger`])
//! so log lines and download spinners never fight for the terminal.

mod interactive;
mod output;

use clap::{Args, Parser, Subcommand};
use energy_map_analytics_models::RankBy;
use energy_map_cli_utils::{IndicatifProgress, MultiProgress};
use energy_map_explorer::{ExplorerSession, FilterState, LoadRequest, LoadedDataset, load_dataset};
use energy_map_geography::{BoundaryDefinition, match_state_name, normalize_state_name};
use energy_map_geography_models::states::state_names;
use energy_map_source::SourceLocation;
use energy_map_source::normalize::CoordinatePolicy;
use energy_map_source::registry;
use energy_map_source_models::CategoryField;
use energy_map_spatial::{AttributionOptions, CatalogCache};

use crate::output::TableOptions;

#[derive(Parser)]
#[command(name = "energy-map", about = "Mexican energy permit statistics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the data comes from and how it is attributed.
#[derive(Args, Clone)]
struct LoadArgs {
    /// Dataset id (see `datasets`)
    #[arg(long, default_value = "electricity")]
    dataset: String,
    /// CSV URL or path, overriding the dataset's published spreadsheet
    #[arg(long)]
    csv: Option<String>,
    /// Boundary set id (see `boundaries`), or "none" to skip regions.
    /// Defaults to the dataset's own boundary set.
    #[arg(long)]
    regions: Option<String>,
    /// `GeoJSON` URL or path, overriding the boundary set's download URL
    #[arg(long)]
    boundaries: Option<String>,
    /// Keep rows without usable coordinates in totals and categories
    #[arg(long)]
    keep_unlocated: bool,
    /// Count permits that fall inside more than one region
    #[arg(long)]
    detect_overlaps: bool,
}

#[derive(Args, Clone, Copy)]
struct OutputArgs {
    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
    /// Rows per table
    #[arg(long, default_value = "10")]
    top: usize,
    /// Ranking order: capacity, output or count
    #[arg(long, default_value = "capacity")]
    rank_by: RankBy,
}

impl OutputArgs {
    const fn table_options(self) -> TableOptions {
        TableOptions {
            top: self.top,
            rank_by: self.rank_by,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered permit datasets
    Datasets,
    /// List the registered boundary sets
    Boundaries,
    /// Print statistics for a whole dataset
    Stats {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print statistics for a region and/or category value
    Filter {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Region name (e.g., "Central" or "09 Ciudad de México")
        #[arg(long)]
        region: Option<String>,
        /// Category field: state, technology, permit_type, brand or status
        #[arg(long)]
        category: Option<CategoryField>,
        /// Category value to match (requires --category)
        #[arg(long)]
        value: Option<String>,
    },
    /// Search permits by number, holder or category value
    Search {
        #[command(flatten)]
        load: LoadArgs,
        /// Text to look for (case-insensitive)
        query: String,
        /// Restrict the search to one region
        #[arg(long)]
        region: Option<String>,
        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show how a state name is matched against the official state names
    MatchState {
        /// State name as written in a spreadsheet (e.g., "09 Ciudad de México")
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = energy_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi).await;
    };

    match command {
        Commands::Datasets => {
            println!("{:<16} {:<16} {:<8} NAME", "ID", "REGIONS", "SHEET");
            println!("{}", "-".repeat(80));
            for def in registry::all_datasets()? {
                println!(
                    "{:<16} {:<16} {:<8} {}",
                    def.id(),
                    def.default_boundary.as_deref().unwrap_or("-"),
                    if def.sheet_url.is_some() { "yes" } else { "no" },
                    def.name()
                );
            }
        }
        Commands::Boundaries => {
            println!("{:<16} {:<30} {:<32} URL", "ID", "KIND", "NAME");
            println!("{}", "-".repeat(116));
            for def in energy_map_geography::all_boundaries()? {
                println!(
                    "{:<16} {:<30} {:<32} {}",
                    def.id,
                    def.kind.label(),
                    def.name,
                    def.url
                );
            }
        }
        Commands::Stats { load, output } => {
            let session = load_session(&load, &multi).await?;
            print_current(&session, output)?;
        }
        Commands::Filter {
            load,
            output,
            region,
            category,
            value,
        } => {
            let mut session = load_session(&load, &multi).await?;
            match (region.as_deref(), category, value.as_deref()) {
                (Some(region), Some(field), Some(value)) => {
                    session.filter_by_region_and_category(region, field, value);
                }
                (Some(region), None, None) => {
                    session.filter_by_region(region);
                }
                (None, Some(field), Some(value)) => {
                    session.filter_by_category(field, value);
                }
                _ => {
                    return Err(
                        "filter needs --region, --category with --value, or all three".into(),
                    );
                }
            }
            if let FilterState::Filtered(view) = session.state() {
                log::info!("Filter {}: {} permits", view.criteria, view.permits.len());
            }
            print_current(&session, output)?;
        }
        Commands::Search {
            load,
            query,
            region,
            limit,
            json,
        } => {
            let mut session = load_session(&load, &multi).await?;
            if let Some(region) = region.as_deref() {
                session.filter_by_region(region);
            }
            let found = session.search(&query, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                output::print_permits(session.dataset(), &found);
            }
        }
        Commands::MatchState { name } => {
            println!("Normalized: {}", normalize_state_name(&name));
            match match_state_name(&name, state_names()) {
                Some(found) => println!("Match:      {} ({:?})", found.name, found.kind),
                None => println!("Match:      none"),
            }
        }
    }

    Ok(())
}

fn print_current(
    session: &ExplorerSession,
    args: OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.current_stats())?);
    } else {
        output::print_stats(
            session.dataset(),
            session.current_stats(),
            args.table_options(),
        );
    }
    Ok(())
}

/// Resolves the boundary set for a dataset: an explicit id wins, `"none"`
/// disables regions, otherwise the dataset's default applies.
fn resolve_boundary(
    requested: Option<&str>,
    default: Option<&str>,
) -> Result<Option<BoundaryDefinition>, energy_map_geography::GeographyError> {
    match requested.or(default) {
        None | Some("none") => Ok(None),
        Some(id) => energy_map_geography::boundary(id).map(Some),
    }
}

async fn load_session(
    args: &LoadArgs,
    multi: &MultiProgress,
) -> Result<ExplorerSession, Box<dyn std::error::Error>> {
    let dataset = registry::dataset(&args.dataset)?;
    let boundary = resolve_boundary(args.regions.as_deref(), dataset.default_boundary.as_deref())?;

    let request = LoadRequest {
        csv: args.csv.as_deref().map(SourceLocation::parse),
        boundary,
        boundary_location: args.boundaries.as_deref().map(SourceLocation::parse),
        policy: if args.keep_unlocated {
            CoordinatePolicy::KeepUnlocated
        } else {
            CoordinatePolicy::Require
        },
        ..LoadRequest::new(dataset)
    };

    let client = reqwest::Client::new();
    let mut cache = CatalogCache::new();
    let loaded = load(&client, &mut cache, &request, multi).await?;

    Ok(ExplorerSession::with_options(
        loaded.dataset,
        loaded.permits,
        loaded.catalog,
        AttributionOptions {
            detect_overlaps: args.detect_overlaps,
        },
    ))
}

/// Loads a dataset behind a spinner.
pub(crate) async fn load(
    client: &reqwest::Client,
    cache: &mut CatalogCache,
    request: &LoadRequest,
    multi: &MultiProgress,
) -> Result<LoadedDataset, Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::spinner(multi, &format!("Loading {}", request.dataset.name));
    let loaded = load_dataset(client, cache, request, &progress).await?;

    log::info!(
        "Loaded {} permits of {} at {}",
        loaded.permits.len(),
        loaded.dataset.name,
        loaded.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(loaded)
}
