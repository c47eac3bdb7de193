use std::sync::Arc;

use anyhow::{Context, Result};

use crate::embedding::Embedder;
use crate::models::RetrievalResult;
use crate::vector_store::RecipeIndex;

#[derive(Clone)]
pub struct Retriever {
    index: Arc<RecipeIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<RecipeIndex>, embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            index,
            embedder,
            top_k,
        }
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let index = self.index.clone();
        let embedder = self.embedder.clone();
        let query = query.to_string();
        let top_k = self.top_k;

        tokio::task::spawn_blocking(move || {
            let vector = embedder.embed_one(&query)?;
            index.search(&vector, top_k)
        })
        .await
        .context("retrieval task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::{FailingEmbedder, HashingEmbedder};
    use crate::models::{Recipe, RecipeDocument};

    fn index_with(embedder: &HashingEmbedder, names: &[(&str, &str)]) -> Arc<RecipeIndex> {
        let documents: Vec<RecipeDocument> = names
            .iter()
            .enumerate()
            .map(|(i, (name, ingredients))| {
                RecipeDocument::from_recipe(
                    i as u64,
                    Recipe {
                        name: name.to_string(),
                        ingredients: ingredients.to_string(),
                        instructions: "Cook.".to_string(),
                        time: 15,
                        servings: 2,
                        diet: "Vegetarian".to_string(),
                    },
                )
            })
            .collect();
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = embedder.embed(&texts).unwrap();
        Arc::new(
            RecipeIndex::build(embedder.model_id(), embedder.dimensions(), documents, vectors)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn returns_at_most_top_k() {
        let embedder = HashingEmbedder::new();
        let index = index_with(
            &embedder,
            &[
                ("Pancakes", "egg, flour"),
                ("Omelette", "egg, onion"),
                ("Roti", "flour, water"),
                ("Raita", "curd, cucumber"),
                ("Kheer", "rice, milk, sugar"),
            ],
        );
        let retriever = Retriever::new(index, Arc::new(embedder), 3);

        let hits = retriever.retrieve("egg, flour").await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().any(|h| h.document.metadata.name == "Pancakes"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn reloaded_index_serves_concurrent_queries() {
        let embedder = HashingEmbedder::new();
        let recipes: Vec<(String, String)> = (0..200)
            .map(|i| (format!("Dish {i}"), format!("egg, flour, spice{i}, herb{}", i % 7)))
            .collect();
        let names: Vec<(&str, &str)> = recipes
            .iter()
            .map(|(n, ing)| (n.as_str(), ing.as_str()))
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let index_dir = dir.path().join("vector_db");
        index_with(&embedder, &names).save(&index_dir).unwrap();
        let loaded = Arc::new(RecipeIndex::load(&index_dir).unwrap());
        let retriever = Retriever::new(loaded, Arc::new(embedder), 3);

        let tasks: Vec<_> = (0..256)
            .map(|i| {
                let retriever = retriever.clone();
                tokio::spawn(async move { retriever.retrieve(&format!("egg, spice{i}")).await })
            })
            .collect();

        for task in tasks {
            let hits = task.await.unwrap().unwrap();
            assert_eq!(hits.len(), 3);
        }
    }

    #[tokio::test]
    async fn embedder_failure_propagates() {
        let embedder = HashingEmbedder::new();
        let index = index_with(&embedder, &[("Pancakes", "egg, flour")]);
        let failing = FailingEmbedder {
            message: "model offline".to_string(),
        };
        let retriever = Retriever::new(index, Arc::new(failing), 3);

        let err = retriever.retrieve("egg").await.unwrap_err();
        assert_eq!(err.to_string(), "model offline");
    }
}
