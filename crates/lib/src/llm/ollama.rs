//! Ollama API client (http://127.0.0.1:11434 by default).
//! Non-streaming chat only: the composed prompt is sent as a single user message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationSettings, LlmError, TextGenerator, GENERATION_TIMEOUT};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Client for Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    settings: GenerationSettings,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, settings: GenerationSettings) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// POST /api/chat — non-streaming chat completion.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: self.settings.model.clone(),
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        };
        let res = self
            .client
            .post(&url)
            .timeout(GENERATION_TIMEOUT)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("ollama {} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        Ok(data)
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let res = self.chat(vec![ChatMessage::user(prompt)]).await?;
        let content = res.content();
        if content.trim().is_empty() {
            return Err(LlmError::Empty("ollama".to_string()));
        }
        Ok(content.to_string())
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}
