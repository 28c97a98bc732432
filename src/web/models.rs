use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn session_id(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DEFAULT_SESSION_ID)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "system")]
    System,
}

/// One role-tagged message. Session history only ever holds user and
/// assistant turns; system messages appear in assembled prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_accepts_both_session_id_spellings() {
        let camel: ChatRequest =
            serde_json::from_value(json!({"message": "hola", "sessionId": "s1"})).unwrap();
        assert_eq!(camel.session_id(), "s1");

        let snake: ChatRequest =
            serde_json::from_value(json!({"message": "hola", "session_id": "s2"})).unwrap();
        assert_eq!(snake.session_id(), "s2");
    }

    #[test]
    fn missing_fields_deserialize_to_none() {
        let req: ChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.message.is_none());
        assert_eq!(req.session_id(), DEFAULT_SESSION_ID);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let value = serde_json::to_value(Message::assistant("hola")).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "hola"}));
    }
}
