use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::embedding::Embedder;
use crate::models::{RecipeDocument, RetrievalResult};

const INDEX_FILE: &str = "index.usearch";
const DOCUMENTS_FILE: &str = "documents.json";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub embedding_model: String,
    pub dimensions: usize,
    pub document_count: usize,
    pub source_sha256: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cosine similarity index over recipe documents, persisted as a directory.
pub struct RecipeIndex {
    index: Index,
    documents: HashMap<u64, RecipeDocument>,
    manifest: IndexManifest,
}

impl RecipeIndex {
    pub fn build(
        embedding_model: &str,
        dimensions: usize,
        documents: Vec<RecipeDocument>,
        vectors: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if documents.len() != vectors.len() {
            anyhow::bail!(
                "document/vector count mismatch: {} documents, {} vectors",
                documents.len(),
                vectors.len()
            );
        }

        let index = new_index(dimensions)?;
        index
            .reserve(documents.len())
            .map_err(|e| anyhow!("failed to reserve index capacity: {e}"))?;

        for (document, vector) in documents.iter().zip(&vectors) {
            if vector.len() != dimensions {
                anyhow::bail!(
                    "embedding for recipe {} has {} dims, expected {}",
                    document.id,
                    vector.len(),
                    dimensions
                );
            }
            index
                .add(document.id, vector.as_slice())
                .map_err(|e| anyhow!("failed to add recipe {} to index: {e}", document.id))?;
        }

        let manifest = IndexManifest {
            embedding_model: embedding_model.to_string(),
            dimensions,
            document_count: documents.len(),
            source_sha256: None,
            created_at: Utc::now(),
        };

        Ok(Self {
            index,
            documents: documents.into_iter().map(|doc| (doc.id, doc)).collect(),
            manifest,
        })
    }

    pub fn with_source_sha256(mut self, digest: impl Into<String>) -> Self {
        self.manifest.source_sha256 = Some(digest.into());
        self
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn search(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        if k == 0 || self.documents.is_empty() {
            return Ok(vec![]);
        }
        if vector.len() != self.manifest.dimensions {
            anyhow::bail!(
                "query embedding has {} dims, index expects {}",
                vector.len(),
                self.manifest.dimensions
            );
        }

        let matches = self
            .index
            .search(vector, k)
            .map_err(|e| anyhow!("vector search failed: {e}"))?;

        let mut out = Vec::with_capacity(matches.keys.len());
        for (key, distance) in matches.keys.iter().zip(&matches.distances) {
            let document = self
                .documents
                .get(key)
                .ok_or_else(|| anyhow!("index returned unknown recipe id {key}"))?;
            out.push(RetrievalResult {
                document: document.clone(),
                score: 1.0 - distance,
            });
        }

        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Ok(out)
    }

    /// Writes the index to `dir`, replacing anything already there.
    ///
    /// Files are staged in a sibling directory and swapped in once complete, so
    /// a failed save leaves the previous index untouched.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let name = dir
            .file_name()
            .ok_or_else(|| anyhow!("index path has no directory name: {}", dir.display()))?
            .to_string_lossy()
            .into_owned();
        let staging = dir.with_file_name(format!(".{name}.staging"));
        let previous = dir.with_file_name(format!(".{name}.previous"));

        if staging.is_dir() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)
            .with_context(|| format!("failed creating staging dir {}", staging.display()))?;

        if let Err(err) = self.write_files(&staging) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(err);
        }

        if previous.is_dir() {
            std::fs::remove_dir_all(&previous)?;
        }
        if dir.exists() {
            std::fs::rename(dir, &previous)
                .with_context(|| format!("failed moving aside old index {}", dir.display()))?;
        }
        if let Err(err) = std::fs::rename(&staging, dir) {
            if previous.exists() {
                let _ = std::fs::rename(&previous, dir);
            }
            return Err(err)
                .with_context(|| format!("failed moving new index into {}", dir.display()));
        }
        if previous.exists() {
            std::fs::remove_dir_all(&previous)?;
        }

        Ok(())
    }

    fn write_files(&self, dir: &Path) -> Result<()> {
        let index_path = dir.join(INDEX_FILE);
        self.index
            .save(path_str(&index_path)?)
            .map_err(|e| anyhow!("failed to save vector index: {e}"))?;

        let mut documents: Vec<&RecipeDocument> = self.documents.values().collect();
        documents.sort_by_key(|doc| doc.id);
        std::fs::write(
            dir.join(DOCUMENTS_FILE),
            serde_json::to_vec(&documents)?,
        )?;
        std::fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(&self.manifest)?,
        )?;

        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_bytes = std::fs::read(dir.join(MANIFEST_FILE))
            .with_context(|| format!("failed reading index manifest in {}", dir.display()))?;
        let manifest: IndexManifest =
            serde_json::from_slice(&manifest_bytes).context("corrupted index manifest")?;

        let documents_bytes = std::fs::read(dir.join(DOCUMENTS_FILE))
            .with_context(|| format!("failed reading document store in {}", dir.display()))?;
        let documents: Vec<RecipeDocument> =
            serde_json::from_slice(&documents_bytes).context("corrupted document store")?;

        let index = new_index(manifest.dimensions)?;
        let index_path = dir.join(INDEX_FILE);
        if !index_path.exists() {
            anyhow::bail!("vector index file missing: {}", index_path.display());
        }
        index
            .load(path_str(&index_path)?)
            .map_err(|e| anyhow!("failed to load vector index: {e}"))?;
        // a loaded index has no search thread slots until capacity is reserved
        index
            .reserve(index.size())
            .map_err(|e| anyhow!("failed to reserve index capacity: {e}"))?;

        if index.size() != documents.len() || documents.len() != manifest.document_count {
            anyhow::bail!(
                "index in {} is inconsistent: {} vectors, {} documents, manifest says {}",
                dir.display(),
                index.size(),
                documents.len(),
                manifest.document_count
            );
        }

        Ok(Self {
            index,
            documents: documents.into_iter().map(|doc| (doc.id, doc)).collect(),
            manifest,
        })
    }

    /// Rejects a query-time embedder that differs from the ingestion one.
    pub fn verify_embedder(&self, embedder: &dyn Embedder) -> Result<()> {
        if embedder.model_id() != self.manifest.embedding_model {
            anyhow::bail!(
                "embedding model mismatch: index built with {}, service uses {}",
                self.manifest.embedding_model,
                embedder.model_id()
            );
        }
        if embedder.dimensions() != self.manifest.dimensions {
            anyhow::bail!(
                "embedding dimension mismatch: index has {}, embedder produces {}",
                self.manifest.dimensions,
                embedder.dimensions()
            );
        }
        Ok(())
    }
}

fn new_index(dimensions: usize) -> Result<Index> {
    let options = IndexOptions {
        dimensions,
        metric: MetricKind::Cos,
        quantization: ScalarKind::F32,
        ..Default::default()
    };
    Index::new(&options).map_err(|e| anyhow!("failed to create vector index: {e}"))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("non UTF-8 index path: {}", path.display()))
}
