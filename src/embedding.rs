//! Embedding provider
//!
//! Object-safe seam over the text-embedding service, plus the
//! OpenAI-compatible HTTP client used in production.
//! Uses a long-lived reqwest::Client for connection pooling.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::error;

use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Seam over the embedding service so the index can be built and queried
/// against a mock in tests.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embeddings client for OpenAI-compatible endpoints.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, base_url: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AssistantError::ConfigError(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|_| {
                AssistantError::ConfigError(
                    "OPENAI_API_KEY contains invalid header characters".to_string(),
                )
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .default_headers(headers)
            .build()?;

        let endpoint = format!("{}/v1/embeddings", base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model,
        })
    }

    /// Build the client from OPENAI_API_KEY / OPENAI_BASE_URL / EMBEDDING_MODEL.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        Self::new(api_key, base_url, model)
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Embedding request failed ({}): {}", status, body);
            return Err(AssistantError::EmbeddingError(format!(
                "embedding request returned {}: {}",
                status, body
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().await?;

        // Providers may return entries out of order.
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != inputs.len() {
            return Err(AssistantError::EmbeddingError(format!(
                "provider returned {} embeddings for {} inputs",
                parsed.data.len(),
                inputs.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request_embeddings(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            AssistantError::EmbeddingError("provider returned no embedding".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embeddings(texts).await
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = OpenAiEmbedder::new(
            String::new(),
            DEFAULT_OPENAI_BASE_URL.to_string(),
            DEFAULT_EMBEDDING_MODEL.to_string(),
        );
        assert!(matches!(result, Err(AssistantError::ConfigError(_))));
    }

    #[test]
    fn test_request_serialization() {
        let inputs = vec!["Producto: Crema X".to_string()];
        let request = EmbeddingRequest {
            model: DEFAULT_EMBEDDING_MODEL,
            input: &inputs,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("text-embedding-3-small"));
        assert!(json.contains("Producto: Crema X"));
    }

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let embedder = OpenAiEmbedder::new(
            "key".to_string(),
            "https://api.example.com/".to_string(),
            DEFAULT_EMBEDDING_MODEL.to_string(),
        )
        .unwrap();
        assert_eq!(embedder.endpoint, "https://api.example.com/v1/embeddings");
    }
}
