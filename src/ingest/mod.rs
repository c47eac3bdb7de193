pub mod table;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::embedding::Embedder;
use crate::vector_store::RecipeIndex;

pub use table::{build_documents, load_recipes};

const EMBED_BATCH_SIZE: usize = 64;

#[derive(Clone)]
pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub document_count: usize,
    pub dimensions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Completed(IngestSummary),
    MissingInput(PathBuf),
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Builds a fresh index from `csv_path` and writes it to `index_dir`.
    pub async fn ingest(&self, csv_path: &Path, index_dir: &Path) -> Result<IngestOutcome> {
        let exists = tokio::fs::try_exists(csv_path)
            .await
            .with_context(|| format!("failed checking recipe table {}", csv_path.display()))?;
        if !exists {
            return Ok(IngestOutcome::MissingInput(csv_path.to_path_buf()));
        }

        let source_sha256 = file_sha256(csv_path).await?;

        let embedder = self.embedder.clone();
        let csv_path = csv_path.to_path_buf();
        let index_dir = index_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            build_and_save(embedder.as_ref(), &csv_path, &index_dir, source_sha256)
        })
        .await
        .context("ingest task panicked")?
        .map(IngestOutcome::Completed)
    }
}

fn build_and_save(
    embedder: &dyn Embedder,
    csv_path: &Path,
    index_dir: &Path,
    source_sha256: String,
) -> Result<IngestSummary> {
    tracing::info!("reading recipes from {}", csv_path.display());
    let recipes = load_recipes(csv_path)?;
    if recipes.is_empty() {
        anyhow::bail!("no recipes found in {}", csv_path.display());
    }

    let documents = build_documents(recipes);
    tracing::info!("built {} recipe documents", documents.len());

    let mut vectors = Vec::with_capacity(documents.len());
    for batch in documents.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|doc| doc.content.clone()).collect();
        let embedded = embedder.embed(&texts).with_context(|| {
            format!(
                "failed embedding recipes {}..{}",
                batch[0].id,
                batch[0].id + batch.len() as u64
            )
        })?;
        vectors.extend(embedded);
        tracing::debug!("embedded {}/{} recipes", vectors.len(), documents.len());
    }

    let index = RecipeIndex::build(
        embedder.model_id(),
        embedder.dimensions(),
        documents,
        vectors,
    )?
    .with_source_sha256(source_sha256);

    index.save(index_dir)?;
    tracing::info!(
        "saved index with {} recipes to {}",
        index.len(),
        index_dir.display()
    );

    Ok(IngestSummary {
        document_count: index.len(),
        dimensions: index.manifest().dimensions,
    })
}

async fn file_sha256(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed reading file for hash: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
