use anyhow::Result;

/// Text embedding provider shared by ingestion and the service.
///
/// Both sides must use the same model; the identifier is recorded in the
/// index manifest and checked when the service loads the index.
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for query"))
    }
}

#[cfg(feature = "embedding")]
pub use fast::FastEmbedder;

#[cfg(feature = "embedding")]
mod fast {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

    use super::Embedder;

    /// Local ONNX sentence embedder backed by fastembed.
    #[derive(Clone)]
    pub struct FastEmbedder {
        model: Arc<TextEmbedding>,
        model_id: String,
        dimensions: usize,
    }

    impl FastEmbedder {
        pub fn new(model_id: &str) -> Result<Self> {
            let (model_name, dimensions) = resolve_model(model_id)?;

            let mut options = InitOptions::default();
            options.model_name = model_name;
            let model = TextEmbedding::try_new(options)
                .map_err(|e| anyhow!("failed to load embedding model {model_id}: {e}"))?;

            tracing::info!("loaded embedding model {} ({} dims)", model_id, dimensions);
            Ok(Self {
                model: Arc::new(model),
                model_id: model_id.to_string(),
                dimensions,
            })
        }
    }

    impl Embedder for FastEmbedder {
        fn model_id(&self) -> &str {
            &self.model_id
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.model
                .embed(texts.to_vec(), None)
                .map_err(|e| anyhow!("failed to generate embeddings: {e}"))
        }
    }

    fn resolve_model(model_id: &str) -> Result<(EmbeddingModel, usize)> {
        let short = model_id.rsplit('/').next().unwrap_or(model_id);
        match short.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
            "all-minilm-l12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
            "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
            "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
            _ => anyhow::bail!("unsupported embedding model: {model_id}"),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn resolves_sentence_transformers_names() {
            let (model, dims) = resolve_model("sentence-transformers/all-MiniLM-L6-v2").unwrap();
            assert!(matches!(model, EmbeddingModel::AllMiniLML6V2));
            assert_eq!(dims, 384);
        }

        #[test]
        fn rejects_unknown_model() {
            assert!(resolve_model("acme/unknown-encoder").is_err());
        }
    }
}
