use anyhow::Result;

use crate::gemini::GeminiClient;
use crate::models::{RecipeMetadata, RecommendRequest, RecommendResponse, RetrievalResult};
use crate::retrieval::Retriever;

const CONTEXT_DELIMITER: &str = "\n---\n";

#[derive(Clone)]
pub struct ChefService {
    retriever: Retriever,
    gemini: GeminiClient,
}

impl ChefService {
    pub fn new(retriever: Retriever, gemini: GeminiClient) -> Self {
        Self { retriever, gemini }
    }

    pub async fn recommend(&self, request: RecommendRequest) -> Result<RecommendResponse> {
        let query = request.ingredients.join(", ");

        let retrieved = self.retriever.retrieve(&query).await?;
        tracing::debug!("retrieved {} recipes for [{}]", retrieved.len(), query);

        let context = build_context(&retrieved);
        let prompt = build_prompt(&query, &request.constraints, &context);

        let chef_advice = self.gemini.generate_text(&prompt).await?;
        Ok(RecommendResponse { chef_advice })
    }
}

pub fn format_recipe_block(metadata: &RecipeMetadata, content: &str) -> String {
    format!(
        "RECIPE: {}\nTIME: {} mins\nSERVINGS: {}\nDIET: {}\nDETAILS: {}\n",
        metadata.name, metadata.time, metadata.servings, metadata.diet, content
    )
}

pub fn build_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .map(|hit| format_recipe_block(&hit.document.metadata, &hit.document.content))
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

pub fn build_prompt(query: &str, constraints: &str, context: &str) -> String {
    format!(
        "You are a master Chef known for being practical and creative. \
         A user wants to cook with: {query}.\n\
         USER CONSTRAINTS: {constraints}\n\n\
         TASK:\n\
         1. Review the recipes below from our database.\n\
         2. If a recipe matches the constraints, suggest it normally.\n\
         3. IF NO RECIPE FITS THE CONSTRAINTS (like the {constraints}), \
         DO NOT REFUSE. Instead, pick the closest recipe and provide a 'Chef's Shortcut' \
         to make it work. For example, if they only have 15 mins, tell them how to \
         skip steps or use higher heat to finish it faster.\n\
         4. Always mention the original Time, Servings, and Diet from the metadata.\n\n\
         DATABASE ENTRIES:\n{context}\n\n\
         Keep your tone encouraging and solution-oriented!"
    )
}
