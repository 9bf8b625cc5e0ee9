use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use kn_core::{Config, Embedder, Result, VectorIndex};
use kn_inference::OpenAiEmbedder;
use kn_scrapers::{HttpFetcher, Pipeline};
use kn_storage::PineconeIndex;
use kn_web::{create_app, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape municipal news into a vector index and search it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scrape the news listing once and index all articles
    Ingest {
        /// Maximum number of listing entries to process
        #[arg(long)]
        max_articles: Option<usize>,
        /// Where to write the JSON snapshot of the run
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Bound on concurrent per-article processing
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Serve the search API
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8000
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(config.openai_api_key.clone())?);
    let index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::new(&config)?);

    match cli.command {
        Commands::Ingest {
            max_articles,
            snapshot,
            concurrency,
        } => {
            let fetcher = Arc::new(HttpFetcher::new()?);
            let pipeline = Pipeline::new(fetcher, embedder, index, config.listing_url.clone())
                .with_max_articles(max_articles.unwrap_or(config.max_articles))
                .with_concurrency(concurrency.unwrap_or(config.ingest_concurrency))
                .with_snapshot_path(snapshot.unwrap_or_else(|| config.snapshot_path.clone()));

            let report = pipeline.run().await?;
            for failure in &report.failures {
                info!(
                    "recovered failure at {} for {}: {}",
                    failure.stage, failure.url, failure.reason
                );
            }
            info!(
                "ingested {} articles ({} indexed, {} recovered failures)",
                report.articles.len(),
                report.indexed,
                report.failures.len()
            );
        }
        Commands::Serve { addr } => {
            index.ensure_index(embedder.dimension()).await?;

            let state = AppState {
                embedder,
                index,
                default_top_k: config.search_top_k,
            };
            let app = create_app(state);

            let addr = addr.unwrap_or(config.bind_addr);
            info!("search API listening on {}", addr);
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
