use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chef::config::AppConfig;
use chef::embedding::FastEmbedder;
use chef::ingest::{IngestOutcome, Ingestor};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Embed a recipe CSV into a local vector index")]
struct Cli {
    /// Recipe table; defaults to CHEF_RECIPES_CSV or data/recipes.csv
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Index directory; defaults to CHEF_INDEX_DIR or vector_db
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let csv_path = cli.csv.unwrap_or(config.recipes_csv);
    let index_dir = cli.out.unwrap_or(config.index_dir);

    let model_id = config.embedding_model.clone();
    let embedder = tokio::task::spawn_blocking(move || FastEmbedder::new(&model_id))
        .await
        .context("embedding model load task panicked")??;

    let ingestor = Ingestor::new(Arc::new(embedder));
    match ingestor.ingest(&csv_path, &index_dir).await? {
        IngestOutcome::Completed(summary) => {
            println!(
                "Ingest complete. recipes={} dims={} index={}",
                summary.document_count,
                summary.dimensions,
                index_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        IngestOutcome::MissingInput(path) => {
            tracing::error!("recipe file not found: {}", path.display());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
