use std::sync::Arc;
use storefront_assistant::{
    api::start_server,
    catalog::{CatalogClient, CatalogConfig},
    completion::{CompletionProvider, OpenAiChatClient},
    embedding::{Embedder, OpenAiEmbedder},
    index::ProductIndex,
    orchestrator::TurnOrchestrator,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Storefront Assistant - API Server");
    info!("Port: {}", api_port);

    // Fetch the catalog once; any failure degrades to an empty catalog.
    let records = match CatalogConfig::from_env() {
        Some(config) => CatalogClient::new(config)?.load_or_empty().await,
        None => {
            warn!("WC_BASE_URL not set, starting with an empty catalog");
            Vec::new()
        }
    };

    // Build the similarity index once; read-only for the process lifetime.
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::from_env()?);
    let index = ProductIndex::build(embedder, &records).await?;
    info!("Indexed {} catalog documents", index.len());

    let completions: Arc<dyn CompletionProvider> = Arc::new(OpenAiChatClient::from_env()?);

    let orchestrator = Arc::new(TurnOrchestrator::new(index, completions));

    info!("Orchestrator initialized");
    info!("Starting API server...");

    start_server(orchestrator, api_port).await?;

    Ok(())
}
