use chrono::Local;
use clap::Parser;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rainfall_ingest::config::{Config, ConfigError};
use rainfall_ingest::db::{self, ObservationRepository};
use rainfall_ingest::fetcher::SheetFetcher;
use rainfall_ingest::period::TargetMonth;
use rainfall_ingest::services::IngestService;

#[derive(Parser, Debug)]
#[command(name = "rainfall-ingest")]
#[command(about = "Load this month's rainfall spreadsheets into the curah_hujan_harian table", long_about = None)]
struct Cli {
    /// Year to load (default: current year)
    #[arg(long, env = "TARGET_YEAR")]
    year: Option<i32>,

    /// Month to load, 1-12 (default: current month)
    #[arg(long, env = "TARGET_MONTH")]
    month: Option<u32>,

    /// Source URL or file path; repeat for several. Overrides SOURCE_URLS
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Build the dataset and report, but do not touch the database
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rainfall_ingest=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let current = TargetMonth::containing(Local::now().date_naive());
    let target = TargetMonth::new(
        cli.year.unwrap_or(current.year()),
        cli.month.unwrap_or(current.month()),
    )?;

    let sources = if cli.sources.is_empty() {
        config.source_urls.clone()
    } else {
        cli.sources.clone()
    };
    if sources.is_empty() {
        return Err(ConfigError::NoSources.into());
    }

    info!(
        "Starting rainfall ingest for {} with {} sources (dry run: {})",
        target,
        sources.len(),
        cli.dry_run
    );

    let fetcher = SheetFetcher::new(config.fetch_timeout_secs, config.fetch_retries)?;
    let service = IngestService::new(fetcher);

    let report = if cli.dry_run {
        service.prepare(&sources, target).await.report
    } else {
        let pool = db::connect(config.require_database_url()?, 5).await?;
        let repo = ObservationRepository::new(pool.clone()).with_chunk_size(config.insert_chunk_size);

        let result = service.run(&repo, &sources, target).await;
        pool.close().await;

        match result {
            Ok(report) => report,
            Err(e) => {
                error!("Ingest run failed: {}", e);
                return Err(e.into());
            }
        }
    };

    report.log_summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("Rainfall ingest for {} finished", target);
    Ok(())
}
