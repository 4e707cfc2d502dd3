//! Response composer: turn the user's text (plus an optional tool outcome) into one prompt,
//! run it through the text generator, and package the reply.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::llm::TextGenerator;
use crate::tools::ToolOutcome;

/// User-facing text when generation fails. The raw error goes to `ConversationReply::error`.
pub const APOLOGY_MESSAGE: &str = "I'm sorry, I encountered an error while processing your request. Please try again or contact support if the issue persists.";

/// Final output of one conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationReply {
    pub success: bool,
    pub text: String,
    pub tools_used: Vec<String>,
    pub metadata: Map<String, Value>,
    /// Diagnostic detail; never shown in place of `text`.
    pub error: Option<String>,
}

/// Assemble the prompt: system instructions, the single user turn, then the tool result or failure.
pub fn build_prompt(system_prompt: &str, text: &str, outcome: Option<&ToolOutcome>) -> String {
    let mut prompt = format!("{}\n\nUser: {}\n\nAssistant:", system_prompt.trim(), text);
    let Some(outcome) = outcome else {
        return prompt;
    };
    if outcome.success {
        let results = serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string());
        prompt.push_str("\n\nTool Results: ");
        prompt.push_str(&results);
        prompt.push_str("\n\nBased on the tool results above, provide a helpful response to the user:");
    } else {
        prompt.push_str("\n\nTool Error: ");
        prompt.push_str(if outcome.message_text().is_empty() {
            "Unknown error"
        } else {
            outcome.message_text()
        });
        if let Some(s) = outcome.suggestion.as_deref().filter(|s| !s.is_empty()) {
            prompt.push_str("\nSuggestion: ");
            prompt.push_str(s);
        }
        prompt.push_str("\n\nPlease inform the user about this issue and suggest alternatives:");
    }
    prompt
}

pub struct ResponseComposer {
    generator: Arc<dyn TextGenerator>,
    system_prompt: String,
    agent_name: String,
}

impl ResponseComposer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        system_prompt: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            system_prompt: system_prompt.into(),
            agent_name: agent_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// System instructions with the current local date prepended, so "today" and ETAs make sense.
    fn system_context(&self) -> String {
        let today = chrono::Local::now().format("%Y-%m-%d");
        format!("Today's date: {}\n\n{}", today, self.system_prompt.trim())
    }

    /// Generate the reply for `text`. Generation failures are caught and turned into an
    /// unsuccessful reply with a fixed apology.
    pub async fn compose(&self, text: &str, outcome: Option<&ToolOutcome>) -> ConversationReply {
        let prompt = build_prompt(&self.system_context(), text, outcome);
        let tools_used: Vec<String> = outcome
            .and_then(|o| o.tool_name.clone())
            .into_iter()
            .collect();
        let mut metadata = Map::new();
        metadata.insert("agentName".to_string(), Value::String(self.agent_name.clone()));
        metadata.insert(
            "modelUsed".to_string(),
            Value::String(self.model_name().to_string()),
        );

        match self.generator.generate(&prompt).await {
            Ok(text) => ConversationReply {
                success: true,
                text,
                tools_used,
                metadata,
                error: None,
            },
            Err(e) => {
                log::warn!("composer: generation failed: {}", e);
                ConversationReply {
                    success: false,
                    text: APOLOGY_MESSAGE.to_string(),
                    tools_used,
                    metadata,
                    error: Some(format!("Agent error: {}", e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording {
        prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(LlmError::Api("quota exceeded for key sk-secret".to_string()))
            } else {
                Ok("Here you go.".to_string())
            }
        }

        fn model_name(&self) -> &str {
            "test-model"
        }
    }

    fn recording(fail: bool) -> Arc<Recording> {
        Arc::new(Recording {
            prompts: Mutex::new(Vec::new()),
            fail,
        })
    }

    #[test]
    fn plain_prompt_has_no_tool_section() {
        let p = build_prompt("SYSTEM", "hello", None);
        assert_eq!(p, "SYSTEM\n\nUser: hello\n\nAssistant:");
    }

    #[test]
    fn success_outcome_is_serialized_into_prompt() {
        let outcome = ToolOutcome::succeeded(json!({ "tracking_number": "TR1" }), "ok")
            .with_tool_name("track_package_by_tracking_number");
        let p = build_prompt("SYSTEM", "track TR1", Some(&outcome));
        assert!(p.contains("Tool Results: {"));
        assert!(p.contains("\"tracking_number\": \"TR1\""));
        assert!(p.ends_with("provide a helpful response to the user:"));
        assert!(!p.contains("Tool Error"));
    }

    #[test]
    fn failed_outcome_frames_message() {
        let outcome = ToolOutcome::failed("Package was not found.", "Check the id.");
        let p = build_prompt("SYSTEM", "find PKG1", Some(&outcome));
        assert!(p.contains("Tool Error: Package was not found.\nSuggestion: Check the id."));
        assert!(p.ends_with("suggest alternatives:"));
        assert!(!p.contains("Tool Results"));
    }

    #[tokio::test]
    async fn compose_reports_tool_and_model() {
        let generator = recording(false);
        let composer = ResponseComposer::new(generator.clone(), "SYSTEM", "Package Assistant");
        let outcome = ToolOutcome::succeeded(json!({}), "ok").with_tool_name("find_package_by_id");
        let reply = composer.compose("find PKG1", Some(&outcome)).await;
        assert!(reply.success);
        assert_eq!(reply.text, "Here you go.");
        assert_eq!(reply.tools_used, vec!["find_package_by_id".to_string()]);
        assert_eq!(reply.metadata["modelUsed"], "test-model");
        assert_eq!(reply.metadata["agentName"], "Package Assistant");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Today's date: "));
        assert!(prompts[0].contains("SYSTEM\n\nUser: find PKG1"));
    }

    #[tokio::test]
    async fn generation_failure_does_not_leak_error() {
        let composer = ResponseComposer::new(recording(true), "SYSTEM", "Package Assistant");
        let reply = composer.compose("hello", None).await;
        assert!(!reply.success);
        assert_eq!(reply.text, APOLOGY_MESSAGE);
        assert!(!reply.text.contains("sk-secret"));
        assert!(reply.error.as_deref().unwrap_or("").contains("quota exceeded"));
        assert!(reply.tools_used.is_empty());
    }
}
