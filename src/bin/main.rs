use std::sync::Arc;
use storefront_assistant::{
    catalog::{CatalogClient, CatalogConfig},
    completion::{CompletionProvider, OpenAiChatClient},
    embedding::{Embedder, OpenAiEmbedder},
    index::ProductIndex,
    models::Conversation,
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

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "¿Tienes cremas hidratantes?".to_string());

    info!("Storefront Assistant starting");

    // Fetch the catalog once; any failure degrades to an empty catalog.
    let records = match CatalogConfig::from_env() {
        Some(config) => CatalogClient::new(config)?.load_or_empty().await,
        None => {
            warn!("WC_BASE_URL not set, starting with an empty catalog");
            Vec::new()
        }
    };

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::from_env()?);
    let index = ProductIndex::build(embedder, &records).await?;
    info!("Indexed {} catalog documents", index.len());

    let completions: Arc<dyn CompletionProvider> = Arc::new(OpenAiChatClient::from_env()?);
    let orchestrator = TurnOrchestrator::new(index, completions);

    info!(question = %question, "Running one turn");

    match orchestrator.advance(Conversation::from_question(question)).await {
        Ok(conversation) => {
            println!("\n=== CONVERSACIÓN ===");
            for turn in conversation.turns() {
                println!("[{}] {}", turn.role, turn.content);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Turn failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}
