//! Digest pipeline — binary entrypoint.
//! Thin scheduler surface over the library: collect feeds, run the
//! processing pipeline, or both in sequence.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use secintel_digest::config::ai::AiConfig;
use secintel_digest::config::categories::CategoryPolicy;
use secintel_digest::config::sources;
use secintel_digest::model::Category;
use secintel_digest::oracle::build_oracle;
use secintel_digest::store::RestStore;
use secintel_digest::{ingest, process};

#[derive(Parser)]
#[command(name = "secintel-digest", about = "Security news digest pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all configured feeds and store the raw items
    Collect {
        /// Collect a single category only
        #[arg(short, long)]
        category: Option<String>,
        /// Collect sources with priority <= N only
        #[arg(short, long)]
        priority: Option<u32>,
    },
    /// Score, dedup, select, summarize and persist the daily digest
    Process,
    /// Collect, then process
    All,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn collect(category: Option<String>, priority: Option<u32>) -> Result<()> {
    let category = match category.as_deref() {
        Some(s) => Some(
            Category::parse(s).ok_or_else(|| anyhow::anyhow!("unknown category: {s}"))?,
        ),
        None => None,
    };
    let catalog = sources::filter(sources::load_default()?, category, priority);

    let mut store = RestStore::from_env()?;
    let report = ingest::collect_once(&mut store, &catalog).await?;
    tracing::info!(
        ok = report.sources_ok,
        failed = report.sources_failed,
        saved = report.items_saved,
        "collect finished"
    );
    Ok(())
}

async fn process_digest() -> Result<()> {
    let ai = AiConfig::load_from_file("config/ai.json")?;
    let oracle = build_oracle(&ai);
    let policy = CategoryPolicy::load_default()?;

    let mut store = RestStore::from_env()?;
    let report = process::run_pipeline(&mut store, oracle.as_ref(), &policy).await?;
    tracing::info!(
        loaded = report.loaded,
        scored = report.scored,
        selected = report.selected,
        persisted = report.persisted,
        "process finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Collect { category, priority } => collect(category, priority).await,
        Command::Process => process_digest().await,
        Command::All => {
            collect(None, None).await?;
            process_digest().await
        }
    }
}
