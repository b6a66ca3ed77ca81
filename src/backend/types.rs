//! Wire types exchanged with the chatbot backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One chat conversation thread as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier, unique per user
    pub session_id: String,
    /// Human-readable label
    pub title: String,
    /// Creation timestamp (ISO 8601), assigned by the backend
    pub created_at: String,
    /// Whether the session is pinned to the top of the list
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_pinned: bool,
}

impl Session {
    /// Creates an unpinned session.
    pub fn new(
        session_id: impl Into<String>,
        title: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            title: title.into(),
            created_at: created_at.into(),
            is_pinned: false,
        }
    }

    /// Parses `created_at` for ordering.
    ///
    /// Accepts RFC 3339 timestamps, naive date-times (taken as UTC) and bare
    /// dates. Returns `None` when the value cannot be interpreted.
    ///
    /// # Examples
    ///
    /// ```
    /// use sao_chat::backend::Session;
    ///
    /// let s = Session::new("a", "Budget", "2025-01-01");
    /// assert!(s.created_timestamp().is_some());
    ///
    /// let s = Session::new("b", "Broken", "yesterday");
    /// assert!(s.created_timestamp().is_none());
    /// ```
    pub fn created_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Lenient ISO 8601 parsing used for session ordering.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the user
    User,
    /// Produced by the chatbot
    Assistant,
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message
    pub role: Role,
    /// Message text (markdown for assistant replies)
    pub content: String,
    /// When the message was written
    #[serde(default)]
    pub created_at: String,
}

impl Message {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Standard `{success, message, data}` envelope returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend considers the call successful
    pub success: bool,
    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: Option<T>,
}

/// Body of the history endpoint's `data` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryData {
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Partial update sent with `PATCH /sessions/{user}/{session}`.
///
/// Absent fields are omitted from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New pinned flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
}

impl SessionUpdate {
    /// Update that only changes the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            is_pinned: None,
        }
    }

    /// Update that only changes the pinned flag.
    pub fn pinned(pinned: bool) -> Self {
        Self {
            title: None,
            is_pinned: Some(pinned),
        }
    }
}

/// Body of `POST /query`. The backend expects `user_id` as an integer.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    /// Numeric user id
    pub user_id: i64,
    /// Target session
    pub session_id: String,
    /// User text
    pub query: String,
}

/// `data` field of a successful query response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryAnswer {
    /// Assistant reply
    pub answer: String,
    /// Any additional fields the backend attaches (sources, timings, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_deserialization_without_pin() {
        let json = r#"{
            "session_id": "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11",
            "title": "What is a neural network?",
            "created_at": "2025-11-19T16:29:44.256365+00:00"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.title, "What is a neural network?");
        assert!(!session.is_pinned);
        assert!(session.created_timestamp().is_some());
    }

    #[test]
    fn test_session_deserialization_null_pin() {
        let json = r#"{"session_id":"x","title":"t","created_at":"2025-01-01","is_pinned":null}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(!session.is_pinned);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let full = parse_timestamp("2025-01-02T10:00:00+07:00").unwrap();
        let naive = parse_timestamp("2025-01-02T03:00:00").unwrap();
        assert_eq!(full, naive);

        let date = parse_timestamp("2025-01-02").unwrap();
        assert!(date < full);

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_session_update_omits_absent_fields() {
        let json = serde_json::to_value(SessionUpdate::pinned(true)).unwrap();
        assert_eq!(json, serde_json::json!({"is_pinned": true}));

        let json = serde_json::to_value(SessionUpdate::title("Budget")).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Budget"}));
    }

    #[test]
    fn test_query_request_user_id_is_integer() {
        let request = QueryRequest {
            user_id: 1,
            session_id: "s".to_string(),
            query: "hello".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"user_id\":1"));
    }

    #[test]
    fn test_query_answer_keeps_extra_fields() {
        let json = r#"{"answer":"42","sources":["a.pdf"]}"#;
        let answer: QueryAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(answer.answer, "42");
        assert!(answer.extra.contains_key("sources"));
    }

    #[test]
    fn test_api_response_missing_data() {
        let json = r#"{"success": false, "message": "Session not found"}"#;
        let response: ApiResponse<Vec<Session>> = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Session not found"));
        assert!(response.data.is_none());
    }

    #[test]
    fn test_message_roles() {
        let json = r#"[{"role":"user","content":"hi","created_at":"2025-01-01T00:00:00Z"},
                       {"role":"assistant","content":"hello"}]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(messages[1].created_at.is_empty());
    }
}
