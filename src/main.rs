use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use chef::chef::ChefService;
use chef::embedding::{Embedder, FastEmbedder};
use chef::gemini::GeminiClient;
use chef::retrieval::Retriever;
use chef::vector_store::RecipeIndex;
use chef::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    if config.gemini.api_key.is_none() {
        tracing::warn!("GOOGLE_API_KEY is not set; recommendations will fail");
    }

    let model_id = config.embedding_model.clone();
    let embedder: Arc<dyn Embedder> = Arc::new(
        tokio::task::spawn_blocking(move || FastEmbedder::new(&model_id))
            .await
            .context("embedding model load task panicked")??,
    );

    let index_dir = config.index_dir.clone();
    let index = tokio::task::spawn_blocking(move || RecipeIndex::load(&index_dir))
        .await
        .context("index load task panicked")??;
    index.verify_embedder(embedder.as_ref())?;
    tracing::info!(
        "loaded {} recipes from {}",
        index.len(),
        config.index_dir.display()
    );

    let retriever = Retriever::new(Arc::new(index), embedder, config.retrieval_top_k);
    let gemini = GeminiClient::new(&config.gemini);
    tracing::info!("generating with {}", gemini.model());

    let chef = ChefService::new(retriever, gemini);

    run_server(config, chef).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
