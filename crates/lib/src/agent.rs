//! Agent turn: classify the message, run the matching package lookup (if any), and compose the reply.
//! Each turn is independent; nothing is remembered between calls.

use async_trait::async_trait;
use serde_json::Value;

use crate::composer::{ConversationReply, ResponseComposer};
use crate::intent::{self, Intent};
use crate::tools::ToolDispatcher;

pub const AGENT_NAME: &str = "Package Assistant";

const AGENT_DESCRIPTION: &str = "I'm your Package Assistant! I can help you find packages by ID, track packages by tracking number, view your packages, and answer questions about package status and delivery.";

/// One user message plus optional session context.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub text: String,
    pub user_id: Option<String>,
    pub auth_token: Option<String>,
    /// Accepted and echoed back; never used to load history.
    pub conversation_id: Option<String>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.auth_token = Some(auth_token.into());
        self
    }
}

/// A conversational agent as seen by the HTTP layer.
#[async_trait]
pub trait Assistant: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn capabilities(&self) -> Vec<&'static str>;
    fn example_queries(&self) -> Vec<&'static str>;

    /// Run one turn. Never fails: lookup and generation errors come back as `success = false`.
    async fn handle_message(&self, msg: &InboundMessage) -> ConversationReply;
}

/// Package-tracking assistant: intent classifier, tool dispatcher, and response composer.
pub struct PackageAssistant {
    tools: ToolDispatcher,
    composer: ResponseComposer,
}

impl PackageAssistant {
    pub fn new(tools: ToolDispatcher, composer: ResponseComposer) -> Self {
        Self { tools, composer }
    }

    pub fn tools(&self) -> &ToolDispatcher {
        &self.tools
    }

    pub fn model_name(&self) -> &str {
        self.composer.model_name()
    }

    /// Intent this assistant acts on for `msg`: `None` unless the dispatch gate passes.
    pub fn resolve_intent(&self, msg: &InboundMessage) -> Intent {
        if !intent::should_use_tools(&msg.text) {
            return Intent::None;
        }
        intent::classify_with_context(
            &msg.text,
            msg.user_id.as_deref(),
            msg.auth_token.as_deref(),
        )
    }
}

#[async_trait]
impl Assistant for PackageAssistant {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn description(&self) -> &str {
        AGENT_DESCRIPTION
    }

    fn capabilities(&self) -> Vec<&'static str> {
        vec![
            "Find packages by ID",
            "Track packages by tracking number",
            "View user's packages",
            "Provide package status information",
            "Answer package-related questions",
            "Guide users on package creation and management",
        ]
    }

    fn example_queries(&self) -> Vec<&'static str> {
        vec![
            "Find package PKG175800611738388",
            "What's the status of package PKG175800611738388?",
            "Track package TR123456789",
            "Show me all my packages",
            "What's the status of my package?",
            "How do I create a new package?",
            "Where is my package being delivered?",
        ]
    }

    async fn handle_message(&self, msg: &InboundMessage) -> ConversationReply {
        let turn_id = uuid::Uuid::new_v4().to_string();
        let intent = self.resolve_intent(msg);
        log::debug!("agent: turn {} intent {:?}", turn_id, intent);

        let outcome = if intent.is_none() {
            None
        } else {
            self.tools
                .dispatch(&intent, msg.user_id.as_deref(), msg.auth_token.as_deref())
                .await
        };

        let mut reply = self.composer.compose(&msg.text, outcome.as_ref()).await;
        reply
            .metadata
            .insert("turnId".to_string(), Value::String(turn_id.clone()));
        if !reply.success {
            log::warn!("agent: turn {} failed", turn_id);
        }
        reply
    }
}
