//! Chat, stored message, and conversation turn types for Tutorly.
//!
//! Messages are persisted as an ordered list of typed segments
//! (`[{"type": "text", "value": "..."}]`). Generated turns always carry a
//! single text segment; manually authored messages may mix in richer
//! segment types such as `math`, `video`, or `code`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::llm::MessageRole;

/// Segment type used for plain conversational text.
pub const TEXT_SEGMENT: &str = "text";

/// One typed piece of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Segment {
    /// Build a `text` segment.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: TEXT_SEGMENT.to_string(),
            value: value.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT_SEGMENT
    }
}

/// Durable message content.
///
/// Rows written by this backend are always `Segments`. Anything else found in
/// the store (legacy rows, hand-edited JSON) is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Segments(Vec<Segment>),
    Other(serde_json::Value),
}

impl MessageContent {
    /// Content consisting of a single text segment.
    pub fn text(value: impl Into<String>) -> Self {
        MessageContent::Segments(vec![Segment::text(value)])
    }

    /// Parse the JSON column representation.
    ///
    /// Never fails: text that is not valid JSON is kept as a JSON string.
    pub fn from_json_str(raw: &str) -> Self {
        serde_json::from_str(raw)
            .unwrap_or_else(|_| MessageContent::Other(serde_json::Value::String(raw.to_string())))
    }

    /// Serialize to the JSON column representation.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// Plain conversational text of this content.
    ///
    /// The first `text` segment wins. Without one, the whole structure is
    /// rendered as a JSON string so nothing is silently dropped.
    pub fn plain_text(&self) -> String {
        match self {
            MessageContent::Segments(segments) => segments
                .iter()
                .find(|s| s.is_text())
                .map(|s| s.value.clone())
                .unwrap_or_else(|| serde_json::to_string(segments).unwrap_or_default()),
            MessageContent::Other(serde_json::Value::String(s)) => s.clone(),
            MessageContent::Other(value) => value.to_string(),
        }
    }

    /// Whether the content holds at least one text segment.
    pub fn has_text(&self) -> bool {
        matches!(self, MessageContent::Segments(segments) if segments.iter().any(Segment::is_text))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Segments(segments) => segments.is_empty(),
            MessageContent::Other(value) => value.is_null(),
        }
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Role derived from the stored `is_bot` flag.
    pub fn from_is_bot(is_bot: bool) -> Self {
        if is_bot {
            TurnRole::Assistant
        } else {
            TurnRole::User
        }
    }

    pub fn is_bot(self) -> bool {
        self == TurnRole::Assistant
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// One logical message in a chat's timeline, as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, text)
    }
}

/// A message row as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub chat_id: i64,
    pub content: MessageContent,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Normalize this row into a plain conversation turn.
    pub fn to_turn(&self) -> ConversationTurn {
        ConversationTurn {
            role: TurnRole::from_is_bot(self.is_bot),
            text: self.content.plain_text(),
            created_at: self.created_at,
        }
    }
}

/// A message about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub chat_id: i64,
    pub content: MessageContent,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// Wrap a conversation turn as a single-text-segment row for `chat_id`.
    pub fn from_turn(chat_id: i64, turn: &ConversationTurn) -> Self {
        Self {
            chat_id,
            content: MessageContent::text(turn.text.clone()),
            is_bot: turn.role.is_bot(),
            created_at: turn.created_at,
        }
    }
}

/// A tutoring conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChat {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A chat plus the plain text of its newest message, for chat lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_serde_uses_type_key() {
        let json = serde_json::to_string(&Segment::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","value":"hi"}"#);
    }

    #[test]
    fn test_plain_text_prefers_first_text_segment() {
        let content = MessageContent::Segments(vec![
            Segment {
                kind: "math".to_string(),
                value: "x^2".to_string(),
            },
            Segment::text("first"),
            Segment::text("second"),
        ]);
        assert_eq!(content.plain_text(), "first");
        assert!(content.has_text());
    }

    #[test]
    fn test_plain_text_falls_back_to_json_rendering() {
        let content = MessageContent::Segments(vec![Segment {
            kind: "video".to_string(),
            value: "dQw4w9WgXcQ".to_string(),
        }]);
        let text = content.plain_text();
        assert!(text.contains("video"));
        assert!(text.contains("dQw4w9WgXcQ"));
        assert!(!content.has_text());
    }

    #[test]
    fn test_from_json_str_segments() {
        let content = MessageContent::from_json_str(r#"[{"type":"text","value":"Hello"}]"#);
        assert_eq!(content, MessageContent::text("Hello"));
    }

    #[test]
    fn test_from_json_str_legacy_plain_string() {
        let content = MessageContent::from_json_str("not json at all");
        assert_eq!(content.plain_text(), "not json at all");
        assert!(!content.has_text());
    }

    #[test]
    fn test_from_json_str_other_structure() {
        let content = MessageContent::from_json_str(r#"{"answer": 42}"#);
        assert!(matches!(content, MessageContent::Other(_)));
        assert_eq!(content.plain_text(), r#"{"answer":42}"#);
    }

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let parsed: TurnRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert_eq!(TurnRole::from_is_bot(true), TurnRole::Assistant);
        assert_eq!(TurnRole::from_is_bot(false), TurnRole::User);
    }

    #[test]
    fn test_stored_message_to_turn() {
        let created_at = Utc::now();
        let msg = StoredMessage {
            id: 1,
            chat_id: 7,
            content: MessageContent::text("Answer"),
            is_bot: true,
            created_at,
        };
        let turn = msg.to_turn();
        assert_eq!(turn.role, TurnRole::Assistant);
        assert_eq!(turn.text, "Answer");
        assert_eq!(turn.created_at, created_at);
    }

    #[test]
    fn test_chat_summary_serializes_last_message_camel_case() {
        let summary = ChatSummary {
            chat: Chat {
                id: 3,
                title: "Vectors".to_string(),
                tags: vec!["Physics".to_string()],
                notes: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            last_message: Some("hi".to_string()),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["lastMessage"], "hi");
        assert_eq!(json["id"], 3);
        assert_eq!(json["tags"][0], "Physics");
    }
}
