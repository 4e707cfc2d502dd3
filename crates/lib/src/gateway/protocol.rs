//! Gateway HTTP wire types (chat, agent info, tool queries).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::InboundMessage;
use crate::composer::ConversationReply;

/// `POST /chat` body: `{ "message", "userId"?, "authToken"?, "conversationId"? }`.
/// Snake_case spellings are accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, alias = "user_id")]
    pub user_id: Option<String>,
    #[serde(default, alias = "auth_token")]
    pub auth_token: Option<String>,
    #[serde(default, alias = "conversation_id")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn into_inbound(self) -> InboundMessage {
        InboundMessage {
            text: self.message,
            user_id: self.user_id,
            auth_token: self.auth_token,
            conversation_id: self.conversation_id,
        }
    }
}

/// `POST /chat` reply. `error` is diagnostic only; `response` is always user-facing text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn from_reply(reply: ConversationReply, conversation_id: Option<String>) -> Self {
        Self {
            success: reply.success,
            response: reply.text,
            conversation_id,
            tools_used: reply.tools_used,
            metadata: reply.metadata,
            error: reply.error,
        }
    }
}

/// `GET /agent/status` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub status: String,
    pub agent_name: String,
    pub model: String,
    pub capabilities: Vec<String>,
    pub example_queries: Vec<String>,
}

/// `GET /agent/capabilities` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub agent_name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub example_queries: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindPackageQuery {
    pub package_id: String,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPackageQuery {
    pub tracking_number: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserPackagesQuery {
    pub user_id: String,
    pub auth_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_accepts_both_spellings() {
        let camel: ChatRequest = serde_json::from_value(json!({
            "message": "hi",
            "userId": "u1",
            "authToken": "t1",
            "conversationId": "c1"
        }))
        .unwrap();
        let snake: ChatRequest = serde_json::from_value(json!({
            "message": "hi",
            "user_id": "u1",
            "auth_token": "t1",
            "conversation_id": "c1"
        }))
        .unwrap();
        for req in [camel, snake] {
            assert_eq!(req.user_id.as_deref(), Some("u1"));
            assert_eq!(req.auth_token.as_deref(), Some("t1"));
            assert_eq!(req.conversation_id.as_deref(), Some("c1"));
        }
    }

    #[test]
    fn chat_request_context_is_optional() {
        let req: ChatRequest = serde_json::from_value(json!({ "message": "hello" })).unwrap();
        let msg = req.into_inbound();
        assert_eq!(msg.text, "hello");
        assert!(msg.user_id.is_none() && msg.auth_token.is_none());
    }

    #[test]
    fn chat_response_wire_shape() {
        let mut metadata = Map::new();
        metadata.insert("modelUsed".to_string(), json!("m"));
        let reply = ConversationReply {
            success: true,
            text: "ok".to_string(),
            tools_used: vec!["find_package_by_id".to_string()],
            metadata,
            error: None,
        };
        let v = serde_json::to_value(ChatResponse::from_reply(reply, Some("c9".into()))).unwrap();
        assert_eq!(v["response"], "ok");
        assert_eq!(v["conversationId"], "c9");
        assert_eq!(v["toolsUsed"], json!(["find_package_by_id"]));
        assert_eq!(v["metadata"]["modelUsed"], "m");
        assert!(v.get("error").is_none());
    }
}
