//! Chats, their messages, and the frames pushed over a chat stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::project::ProjectId;

/// Chat ID type
pub type ChatId = i64;

/// Message ID type
pub type MessageId = i64;

/// Chat model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Chat creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChat {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A stored chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Body for posting a message, over HTTP or over the chat stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub content: String,
}

impl NewMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Frames received on a chat stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// A chunk of the assistant reply being generated
    Token { content: String },
    /// The reply is finished and has been stored
    MessageComplete { message: ChatMessage },
    /// The server gave up on the current reply
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_token_frame() {
        let event: ChatStreamEvent =
            serde_json::from_value(json!({ "type": "token", "content": "Hel" })).unwrap();
        assert_eq!(
            event,
            ChatStreamEvent::Token {
                content: "Hel".to_string()
            }
        );
    }

    #[test]
    fn test_decode_message_complete_frame() {
        let event: ChatStreamEvent = serde_json::from_value(json!({
            "type": "message_complete",
            "message": {
                "id": 12,
                "chat_id": 4,
                "role": "assistant",
                "content": "Hello",
                "created_at": "2024-05-01T12:00:00Z"
            }
        }))
        .unwrap();

        match event {
            ChatStreamEvent::MessageComplete { message } => {
                assert_eq!(message.chat_id, 4);
                assert_eq!(message.role, MessageRole::Assistant);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        let result = serde_json::from_value::<ChatStreamEvent>(json!({ "type": "typing" }));
        assert!(result.is_err());
    }
}
