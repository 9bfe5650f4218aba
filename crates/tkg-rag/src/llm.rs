//! LLM Client implementations
//!
//! OpenAI-compatible chat completions and Ollama `/api/chat`. Replies from
//! both have reasoning `<think>` blocks stripped before they are returned.
//!
//! Author: hephaex@gmail.com

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tkg_core::{ChatMessage, LlmClient, LlmConfig, LlmProvider, Result, TkgError};
use tkg_extractor::remove_think_blocks;
use tracing::{debug, warn};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TkgError::Llm(format!("Failed to build HTTP client: {e}")))
}

// ============================================================================
// OpenAI Client
// ============================================================================

/// OpenAI-compatible API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| TkgError::Config("OpenAI API key required".to_string()))?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.clone(),
            base_url: config
                .openai_base_url
                .clone()
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Set custom base URL (for compatible servers)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OpenAiRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TkgError::Llm(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TkgError::Llm(format!("OpenAI error: {error_text}")));
        }

        let result: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| TkgError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| remove_think_blocks(&content))
            .ok_or_else(|| TkgError::Llm("No response generated".to_string()))
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: &'a OllamaOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    message: Option<ReplyMessage>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            options: OllamaOptions {
                temperature: 0.2,
                num_predict: 2048,
            },
        }
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.ollama_url.clone(),
            model: config.model.clone(),
            options: OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        })
    }
}

/// Join the message contents of an Ollama reply.
///
/// Accepts a single JSON object or newline-delimited chunks; malformed lines
/// are skipped.
pub fn parse_ollama_reply(body: &str) -> String {
    let mut reply = String::new();

    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<OllamaChunk>(line) {
            Ok(chunk) => {
                if let Some(content) = chunk.message.and_then(|m| m.content) {
                    reply.push_str(&content);
                }
            }
            Err(e) => warn!(error = %e, "Skipping malformed Ollama line"),
        }
    }

    reply
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(|e| TkgError::Llm(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TkgError::Llm(format!("Ollama error: {error_text}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TkgError::Llm(format!("Failed to read Ollama response: {e}")))?;
        debug!(bytes = body.len(), "Ollama reply received");

        Ok(remove_think_blocks(&parse_ollama_reply(&body)))
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::OpenAI => Ok(Box::new(OpenAiClient::from_config(config)?)),
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::from_config(config)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new("test-key", "gpt-4o-mini", 2048, 0.1)
            .with_base_url("http://localhost:8080/v1");
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_openai_requires_key() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAI,
            openai_api_key: None,
            ..LlmConfig::default()
        };
        assert!(matches!(
            create_llm_client(&config),
            Err(TkgError::Config(_))
        ));
    }

    #[test]
    fn test_ollama_from_config() {
        let client = OllamaClient::from_config(&LlmConfig::default()).unwrap();
        assert_eq!(client.model, "deepseek-r1:1.5b");
        assert_eq!(client.options.num_predict, 2048);
    }

    #[test]
    fn test_parse_ollama_single_object() {
        let body = r#"{"message":{"role":"assistant","content":"Hello"},"done":true}"#;
        assert_eq!(parse_ollama_reply(body), "Hello");
    }

    #[test]
    fn test_parse_ollama_ndjson_skips_bad_lines() {
        let body = concat!(
            r#"{"message":{"role":"assistant","content":"<think>x"},"done":false}"#,
            "\n",
            "not json\n",
            r#"{"message":{"role":"assistant","content":"</think>Hi"},"done":false}"#,
            "\n",
            r#"{"done":true}"#,
        );
        let joined = parse_ollama_reply(body);
        assert_eq!(joined, "<think>x</think>Hi");
        assert_eq!(remove_think_blocks(&joined), "Hi");
    }

    #[test]
    fn test_openai_request_serialization() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let request = OpenAiRequest {
            model: "m",
            messages: &messages,
            max_tokens: 10,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
