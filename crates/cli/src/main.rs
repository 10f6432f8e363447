use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use titler_core::listing::fetch_magnet_link;
use titler_core::metrics::encode_metrics;
use titler_core::{
    assign_title, display_name, load_config, mark_titles, order_by_similarity, refresh_titles,
    validate_config, Config, HttpFetcher, IngestReport, Ingestor, Repository, SqliteStore,
    TitleStatus,
};

/// Ingest torrent listing pages and group releases into titles
#[derive(Parser, Debug)]
#[command(name = "titler")]
#[command(about = "Torrent listing ingestion and release title grouping", long_about = None)]
struct Cli {
    /// Defaults to `ingest`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Ingest saved pages of every enabled site, then refresh titles
    Ingest,
    /// Print the magnet link of a detail page
    Magnet {
        /// Detail page URL
        url: String,
    },
    /// Change the status of titles
    Mark {
        /// New status
        #[arg(value_enum)]
        status: StatusArg,
        /// Title texts
        #[arg(required = true, num_args = 1..)]
        titles: Vec<String>,
    },
    /// Link a record to a title by hand
    Assign {
        /// Record detail page URL
        url: String,
        /// Title text
        title: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StatusArg {
    New,
    Skipped,
    Finished,
}

impl From<StatusArg> for TitleStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::New => TitleStatus::New,
            StatusArg::Skipped => TitleStatus::Skipped,
            StatusArg::Finished => TitleStatus::Finished,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = Cli::parse().command.unwrap_or(Commands::Ingest);

    // Determine config path
    let config_path = std::env::var("TITLER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Database path: {:?}", config.database.path);

    match command {
        Commands::Ingest => {
            let summary = ingest(&config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            write_metrics(&config)?;
        }
        Commands::Magnet { url } => {
            let fetcher = HttpFetcher::new(&config.fetch).context("Failed to create fetcher")?;
            let magnet = fetch_magnet_link(&fetcher, &url)
                .await
                .with_context(|| format!("Failed to resolve magnet link of {}", url))?;
            println!("{}", magnet);
            write_metrics(&config)?;
        }
        Commands::Mark { status, titles } => {
            let status = TitleStatus::from(status);
            let store = open_store(&config)?;
            let marked = mark_titles(&store, &titles, status, Utc::now())?;
            info!(count = marked.len(), status = %status, "Titles marked");
        }
        Commands::Assign { url, title } => {
            let store = open_store(&config)?;
            let record = assign_title(&store, &url, &title, Utc::now())?;
            info!(url = %record.url, title = %title, "Record assigned");
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::new(&config.database.path).with_context(|| {
        format!(
            "Failed to open database at {:?}",
            config.database.path
        )
    })
}

/// Ingest every enabled site, refresh titles and summarize the run.
fn ingest(config: &Config) -> Result<serde_json::Value> {
    let store = open_store(config)?;
    let ingestor = Ingestor::new(&store, &config.grouping);
    let now = Utc::now();

    let mut report = IngestReport::default();
    for site in config.enabled_sites() {
        report += ingestor
            .ingest_site(site, now)
            .with_context(|| format!("Failed to ingest {}", site.site))?;
    }

    let refreshed = refresh_titles(&store, now).context("Failed to refresh titles")?;

    let new_titles: Vec<_> = store
        .list_titles()?
        .into_iter()
        .filter(|t| t.status == TitleStatus::New)
        .collect();
    let new_titles: Vec<_> = order_by_similarity(new_titles)
        .into_iter()
        .map(|t| {
            json!({
                "text": t.text,
                "display": display_name(&t.text),
                "priority": t.priority,
            })
        })
        .collect();

    info!(
        pages = report.pages,
        created = report.created,
        refreshed = report.refreshed,
        new_titles = new_titles.len(),
        "Done"
    );

    Ok(json!({
        "ingest": report,
        "titles": refreshed,
        "new_titles": new_titles,
    }))
}

fn write_metrics(config: &Config) -> Result<()> {
    let Some(path) = &config.metrics.textfile else {
        return Ok(());
    };
    let text = encode_metrics().context("Failed to encode metrics")?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics to {:?}", path))?;
    info!("Metrics written to {:?}", path);
    Ok(())
}
