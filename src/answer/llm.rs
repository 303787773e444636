use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::GenerationError;
use crate::constants::{DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE};

/// Per-request generation parameters.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLM_MODEL.to_string(),
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

/// Text generation backend.
pub trait LlmClient: Send + Sync {
    /// Generates a completion for `prompt`.
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}

/// Client for an OpenAI-compatible chat completions endpoint
/// (Ollama, llama.cpp server, vLLM).
#[derive(Clone)]
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl HttpLlmClient {
    /// Creates a client for `endpoint` (base URL, e.g.
    /// `http://localhost:11434/v1`) with a per-request timeout.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::Endpoint {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LlmClient for HttpLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.endpoint);

        debug!(
            model = %params.model,
            prompt_len = prompt.len(),
            "Sending generation request"
        );

        let body = json!({
            "model": params.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    GenerationError::Endpoint {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Endpoint {
                reason: format!("status {status}: {detail}"),
            });
        }

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::Malformed {
                    reason: e.to_string(),
                })?;

        let answer = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerationError::Malformed {
                reason: "response contained no choices".to_string(),
            })?;

        Ok(answer)
    }
}
