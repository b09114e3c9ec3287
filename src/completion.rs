//! Chat-completion provider
//!
//! Object-safe seam over the chat-completion service, plus the
//! OpenAI-compatible HTTP client used in production.
//! Uses a long-lived reqwest::Client for connection pooling.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{error, info};

use crate::error::AssistantError;
use crate::Result;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Storefront persona sent as the system message on every completion.
const SYSTEM_PROMPT: &str = "Eres un asistente especializado en productos de belleza.";

/// Seam over the chat-completion service so the fallback path can be
/// exercised against a mock in tests.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send a prompt and return the model's raw text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Chat client for OpenAI-compatible endpoints.
pub struct OpenAiChatClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OpenAiChatClient {
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
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .default_headers(headers)
            .build()?;

        let endpoint = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            model,
        })
    }

    /// Build the client from OPENAI_API_KEY / OPENAI_BASE_URL / CHAT_MODEL.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let model = env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());

        Self::new(api_key, base_url, model)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!("Calling chat-completion API");

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Chat-completion request failed ({}): {}", status, body);
            return Err(AssistantError::CompletionError(format!(
                "completion request returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                AssistantError::CompletionError("provider returned no choices".to_string())
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = OpenAiChatClient::new(
            String::new(),
            DEFAULT_OPENAI_BASE_URL.to_string(),
            DEFAULT_CHAT_MODEL.to_string(),
        );
        assert!(matches!(result, Err(AssistantError::ConfigError(_))));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: DEFAULT_CHAT_MODEL,
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: "Consulta: tienes crema",
                },
            ],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("productos de belleza"));
        assert!(json.contains("Consulta: tienes crema"));
    }

    #[test]
    fn test_response_parsing() {
        let payload = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Claro, tenemos cremas."}}
            ]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Claro, tenemos cremas.");
    }
}
