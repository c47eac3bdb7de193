use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub recipes_csv: PathBuf,
    pub index_dir: PathBuf,
    pub embedding_model: String,
    pub retrieval_top_k: usize,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Reads configuration from the process environment, after merging a local
    /// `.env` file when one exists.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            bind_addr: env::var("CHEF_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            recipes_csv: env::var("CHEF_RECIPES_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/recipes.csv")),
            index_dir: env::var("CHEF_INDEX_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("vector_db")),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
            retrieval_top_k: env::var("RETRIEVAL_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            gemini: GeminiConfig {
                api_key: env::var("GOOGLE_API_KEY").ok().filter(|v| !v.trim().is_empty()),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
                base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
                temperature: env::var("GEMINI_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.2),
            },
        }
    }
}
