use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/**
 * \brief Chat participant, aligned with the OpenAI chat role names.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/**
 * \brief One chat turn. Immutable once created.
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /** \brief Creator-generated identifier (UUID v4 text). */
    pub id: String,
    /** \brief user / assistant */
    pub role: Role,
    /** \brief Message body */
    pub content: String,
    /** \brief Creation time, UTC. */
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Message {
    /**
     * \brief Create a message stamped with a fresh id and the current time.
     */
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/**
 * \brief Relay request body: `{ "prompt": "..." }`.
 * \details `prompt` is kept as raw JSON so non-string values can still be relayed.
 */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<Value>,
}

impl PromptRequest {
    /**
     * \brief Prompt text to relay, or `None` when the prompt is absent or falsy
     *        (null, false, 0, empty string).
     * \details Strings pass through unchanged; other values are sent as their JSON text.
     */
    pub fn text(&self) -> Option<String> {
        match self.prompt.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/**
 * \brief Relay success envelope: `{ "response": "..." }`.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub response: String,
}
