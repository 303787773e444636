use std::sync::atomic::{AtomicUsize, Ordering};

use super::error::GenerationError;
use super::llm::{GenerationParams, LlmClient};

/// LLM stand-in that echoes the prompt's first context block.
///
/// The echo contains the retrieved chunk text, so grounding assertions
/// ("the answer mentions Paris") hold whenever retrieval surfaced the
/// right chunk.
#[derive(Default)]
pub struct MockLlm {
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlm {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        // First numbered context line, without the "[1] " prefix.
        let context = prompt
            .lines()
            .find(|line| line.starts_with("[1] "))
            .map(|line| &line[4..])
            .unwrap_or("");

        Ok(format!("Based on the context: {context}"))
    }
}

/// LLM stand-in whose every call fails as an endpoint error.
#[derive(Default)]
pub struct FailingLlm {
    calls: AtomicUsize,
}

impl FailingLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for FailingLlm {
    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::Endpoint {
            reason: "injected generation failure".to_string(),
        })
    }
}
