//! Text generation: an opaque "prompt in, text out" capability with Gemini and Ollama backends.

mod gemini;
mod ollama;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{self, AgentsConfig, GenerationBackend};

pub use gemini::GeminiClient;
pub use ollama::{ChatMessage, ChatResponse, OllamaClient};

/// Client-side bound on one generation call.
pub(crate) const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("generation api error: {0}")]
    Api(String),
    #[error("{0} returned no text")]
    Empty(String),
}

/// Model and sampling settings shared by the backends.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generates natural-language text for a prompt. One call per conversation turn.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier reported in reply metadata.
    fn model_name(&self) -> &str;
}

/// Build the configured backend. Gemini without an API key is a startup error.
pub fn build_generator(agents: &AgentsConfig) -> Result<Arc<dyn TextGenerator>> {
    let backend = config::resolve_backend(agents);
    let settings = GenerationSettings {
        model: config::resolve_model(agents, backend),
        temperature: agents.temperature,
        max_tokens: agents.max_tokens,
    };
    log::info!(
        "text generation: backend {} model {}",
        backend.name(),
        settings.model
    );
    match backend {
        GenerationBackend::Gemini => {
            let api_key = config::resolve_gemini_api_key(agents).ok_or_else(|| {
                anyhow::anyhow!(
                    "GOOGLE_AI_API_KEY environment variable (or agents.gemini.apiKey) is required for the gemini backend"
                )
            })?;
            Ok(Arc::new(GeminiClient::new(
                agents.gemini.base_url.clone(),
                api_key,
                settings,
            )))
        }
        GenerationBackend::Ollama => Ok(Arc::new(OllamaClient::new(
            agents.ollama.base_url.clone(),
            settings,
        ))),
    }
}
