//! Chat request wire types.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RelayError;
use crate::provider::Provider;

/// Roles the relay itself writes. Callers may send any role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation turn. Only `role` is required; every other field,
/// `content` included, is forwarded to the provider exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("content".to_string(), Value::String(content.into()));
        Self {
            role: role.as_str().to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Text content, when the turn carries a plain string.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.fields.get("content").and_then(Value::as_str)
    }
}

/// Caller payload: prior turns plus an optional provider selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl ChatRequest {
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>, provider: Option<Provider>) -> Self {
        Self {
            messages,
            provider: provider.map(|provider| provider.as_str().to_string()),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, RelayError> {
        serde_json::from_str(text).map_err(|err| RelayError::InvalidRequest(err.to_string().into()))
    }

    /// Selector as sent, `openai` when omitted.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().unwrap_or(Provider::DEFAULT.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_defaults_to_openai() {
        let request =
            ChatRequest::from_json(r#"{"messages":[{"role":"user","content":"hi"}]}"#)
                .expect("parse request");
        assert_eq!(request.provider_name(), "openai");
        assert_eq!(request.messages, [ChatMessage::user("hi")]);
    }

    #[test]
    fn provider_is_kept_verbatim() {
        let request = ChatRequest::from_json(r#"{"messages":[],"provider":"Gemini"}"#)
            .expect("parse request");
        assert_eq!(request.provider_name(), "Gemini");
    }

    #[test]
    fn turns_keep_unknown_roles_and_extra_fields() {
        let text = r#"{"messages":[
            {"role":"tool","tool_call_id":"call_1","content":"42"},
            {"role":"user","name":"ada","content":[{"type":"text","text":"hi"}]},
            {"role":"assistant","content":null,"tool_calls":[{"id":"call_1"}]}
        ]}"#;
        let request = ChatRequest::from_json(text).expect("parse request");
        assert_eq!(request.messages[0].role, "tool");
        assert_eq!(request.messages[0].content(), Some("42"));
        assert_eq!(request.messages[1].content(), None);

        let echoed = serde_json::to_value(&request.messages).expect("serialize turns");
        let original: Value = serde_json::from_str(text).expect("parse original");
        assert_eq!(echoed, original["messages"]);
    }

    #[test]
    fn built_turns_serialize_as_role_and_content() {
        let turn = ChatMessage::new(ChatRole::System, "Be brief.");
        assert_eq!(
            serde_json::to_value(&turn).expect("serialize"),
            serde_json::json!({ "role": "system", "content": "Be brief." })
        );
        assert_eq!(turn.content(), Some("Be brief."));
    }

    #[test]
    fn malformed_requests_are_rejected() {
        for text in [
            "",
            "{",
            r#"{"provider":"openai"}"#,
            r#"{"messages":"hi"}"#,
            r#"{"messages":[{"content":"x"}]}"#,
            r#"{"messages":[{"role":7,"content":"x"}]}"#,
        ] {
            assert!(
                matches!(ChatRequest::from_json(text), Err(RelayError::InvalidRequest(_))),
                "{text}"
            );
        }
    }
}
