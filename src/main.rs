mod alias;
mod config;
mod dom;
mod extract;
mod fetch;
mod merge;
mod model;
mod pipeline;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use alias::SeasonAliasIndex;
use config::Config;
use fetch::WikiClient;

#[derive(Parser)]
#[command(
    name = "survivor_scraper",
    about = "Survivor wiki scraper: seasons, episodes, per-episode facts"
)]
struct Cli {
    /// Optional JSON config file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for the JSON datasets
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Upper bound for the season-number sweep
    #[arg(long)]
    max_season: Option<u32>,
    /// Politeness delay between requests, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape seasons + episodes + enrichment in one pipeline
    Run,
    /// Scrape season pages only
    Seasons,
    /// Scrape episodes for seasons already on disk
    Episodes {
        /// Skip the per-episode enrichment pass
        #[arg(long)]
        no_enrich: bool,
    },
    /// Re-run the enrichment pass over episodes already on disk
    Enrich,
    /// Show dataset statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(max) = cli.max_season {
        cfg.max_season_guess = max;
    }
    if let Some(delay) = cli.delay_ms {
        cfg.request_delay_ms = delay;
    }

    let result = match cli.command {
        Commands::Run => {
            let client = WikiClient::new(&cfg)?;

            println!("Scraping seasons...");
            let seasons = pipeline::fetch_all_seasons(&client, &cfg).await;
            println!("Got {} seasons.", seasons.len());
            store::save_seasons(&cfg.data_dir, &seasons)?;

            println!("Scraping episodes...");
            let alias = SeasonAliasIndex::build(&seasons);
            let mut episodes = pipeline::fetch_episodes_by_season(&client, &seasons, &alias).await;
            println!("Got episodes for {} seasons.", episodes.len());

            println!("Enriching episodes...");
            pipeline::enrich_episodes(&client, &mut episodes).await;
            store::save_episodes(&cfg.data_dir, &episodes)?;
            println!("Done.");
            Ok(())
        }
        Commands::Seasons => {
            let client = WikiClient::new(&cfg)?;
            println!("Scraping seasons...");
            let seasons = pipeline::fetch_all_seasons(&client, &cfg).await;
            println!("Got {} seasons.", seasons.len());
            store::save_seasons(&cfg.data_dir, &seasons)?;
            Ok(())
        }
        Commands::Episodes { no_enrich } => {
            let stored = store::load_seasons(&cfg.data_dir)?;
            if stored.seasons.is_empty() {
                println!("No seasons on disk. Run 'seasons' first.");
                return Ok(());
            }
            let client = WikiClient::new(&cfg)?;
            println!("Scraping episodes for {} seasons...", stored.seasons.len());
            let alias = SeasonAliasIndex::build(&stored.seasons);
            let mut episodes =
                pipeline::fetch_episodes_by_season(&client, &stored.seasons, &alias).await;
            println!("Got episodes for {} seasons.", episodes.len());
            if !no_enrich {
                println!("Enriching episodes...");
                pipeline::enrich_episodes(&client, &mut episodes).await;
            }
            store::save_episodes(&cfg.data_dir, &episodes)?;
            Ok(())
        }
        Commands::Enrich => {
            let mut stored = store::load_episodes(&cfg.data_dir)?;
            if stored.episodes_by_season.is_empty() {
                println!("No episodes on disk. Run 'episodes' first.");
                return Ok(());
            }
            let client = WikiClient::new(&cfg)?;
            println!("Enriching episodes...");
            pipeline::enrich_episodes(&client, &mut stored.episodes_by_season).await;
            store::save_episodes(&cfg.data_dir, &stored.episodes_by_season)?;
            Ok(())
        }
        Commands::Stats => {
            let seasons = store::load_seasons(&cfg.data_dir)?;
            let episodes = store::load_episodes(&cfg.data_dir)?;
            let episode_count: usize = episodes.episodes_by_season.values().map(|v| v.len()).sum();
            let enriched: usize = episodes
                .episodes_by_season
                .values()
                .flatten()
                .filter(|e| e.enrichment.episode_page_url.is_some())
                .count();
            let dated: usize = episodes
                .episodes_by_season
                .values()
                .flatten()
                .filter(|e| e.air_date.is_some())
                .count();
            println!("Seasons:   {}", seasons.seasons.len());
            println!("Episodes:  {}", episode_count);
            println!("Dated:     {}", dated);
            println!("Enriched:  {}", enriched);
            if let Some(ts) = episodes.updated_at.or(seasons.updated_at) {
                println!("Updated:   {}", ts.format("%Y-%m-%d %H:%M UTC"));
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
