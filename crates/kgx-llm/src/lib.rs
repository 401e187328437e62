//! LLM Client implementations
//!
//! Provides blocking-per-call clients for OpenAI-compatible chat
//! completion APIs (OpenAI, Groq) and Ollama. Every request carries a
//! fixed timeout; callers recover from any error through heuristics.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kgx_core::{KgError, LlmClient, LlmConfig, LlmProvider, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| KgError::Classifier(format!("HTTP client setup failed: {e}")))
}

// ============================================================================
// OpenAI-compatible Client
// ============================================================================

/// Chat completions client for OpenAI-compatible APIs (OpenAI, Groq)
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Choice {
    message: Message,
    finish_reason: Option<String>,
}

impl ChatCompletionsClient {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            max_tokens: 256,
            temperature: 0.0,
        })
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| KgError::MissingCredential("LLM API key required".to_string()))?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            api_key: api_key.clone(),
            base_url: config.resolved_base_url(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    async fn chat(&self, messages: Vec<Message>) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        tracing::debug!(model = %self.model, "chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| KgError::Classifier(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(KgError::Classifier(format!(
                "Chat completion error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| KgError::Classifier(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| KgError::Classifier("No response generated".to_string()))
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }])
        .await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            Message {
                role: "system".to_string(),
                content: system.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ])
        .await
    }

    fn model(&self) -> &str {
        &self.model
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
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct OllamaResponse {
    response: String,
    done: bool,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            base_url: base_url.into(),
            model: model.into(),
            temperature: 0.0,
        })
    }

    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let mut client = Self::new(
            config.resolved_base_url(),
            config.model.clone(),
            config.timeout_secs,
        )?;
        client.temperature = config.temperature;
        Ok(client)
    }

    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };
        tracing::debug!(model = %self.model, "ollama generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| KgError::Classifier(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(KgError::Classifier(format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| KgError::Classifier(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.response.trim().to_string())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(None, prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(Some(system), prompt).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
///
/// Fails with [`KgError::MissingCredential`] when a hosted provider has no
/// API key; callers degrade to heuristic-only mode on that error.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Groq | LlmProvider::OpenAI => {
            Ok(Arc::new(ChatCompletionsClient::from_config(config)?))
        }
        LlmProvider::Ollama => Ok(Arc::new(OllamaClient::from_config(config)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a random local port
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    #[test]
    fn test_chat_client_creation() {
        let client =
            ChatCompletionsClient::new("test-key", "https://api.groq.com/openai/v1", "llama", 5)
                .unwrap();
        assert_eq!(client.model(), "llama");
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", "llama3", 5).unwrap();
        assert_eq!(client.model(), "llama3");
    }

    #[test]
    fn test_factory_requires_key_for_hosted_providers() {
        let config = LlmConfig::default();
        let err = create_llm_client(&config).err().unwrap();
        assert!(matches!(err, KgError::MissingCredential(_)));

        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ..LlmConfig::default()
        };
        assert!(create_llm_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_chat_completion_reply_is_trimmed() {
        let base = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"  worksAt\n"},"finish_reason":"stop"}]}"#,
        )
        .await;

        let client = ChatCompletionsClient::new("key", base, "llama", 5).unwrap();
        let reply = client
            .generate_with_system("system", "prompt")
            .await
            .unwrap();
        assert_eq!(reply, "worksAt");
    }

    #[tokio::test]
    async fn test_chat_completion_http_error() {
        let base = serve_once("401 Unauthorized", r#"{"error":"invalid key"}"#).await;

        let client = ChatCompletionsClient::new("bad", base, "llama", 5).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, KgError::Classifier(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_classifier_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let client = ChatCompletionsClient::new("key", "http://127.0.0.1:9", "llama", 1).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, KgError::Classifier(_)));
    }
}
