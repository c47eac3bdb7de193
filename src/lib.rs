pub mod chef;
pub mod config;
pub mod embedding;
pub mod gemini;
pub mod ingest;
pub mod models;
pub mod retrieval;
pub mod server;
pub mod vector_store;

pub use config::AppConfig;
pub use server::run_server;
