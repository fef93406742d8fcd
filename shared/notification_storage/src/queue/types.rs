use serde::{Deserialize, Serialize};

/// Category of an inbound notification message.
///
/// The recognized values carry fixed display strings; everything else falls
/// into [`NotificationKind::Other`] so the title/message lookup is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// A word was saved to the user's dictionary
    WordSaved,
    /// The user received a new message
    NewMessage,
    /// A word was removed from the user's dictionary
    WordForgotten,
    /// Any unrecognized category, kept verbatim for persistence
    Other(String),
}

impl NotificationKind {
    /// Returns the wire representation of the kind
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::WordSaved => "WORD_SAVED",
            Self::NewMessage => "NEW_MESSAGE",
            Self::WordForgotten => "WORD_FORGOTTEN",
            Self::Other(raw) => raw,
        }
    }

    /// Returns the display title for this kind
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::WordSaved => "Palabra guardada",
            Self::NewMessage => "Nuevo mensaje",
            Self::WordForgotten => "Palabra olvidada",
            Self::Other(_) => "Notificación",
        }
    }

    /// Returns the display message for this kind
    #[must_use]
    pub const fn body(&self) -> &'static str {
        match self {
            Self::WordSaved => "Se guardó una nueva palabra en tu diccionario.",
            Self::NewMessage => "Tienes un nuevo mensaje.",
            Self::WordForgotten => "Quitaste una palabra de tu diccionario.",
            Self::Other(_) => "Tienes una nueva notificación.",
        }
    }
}

impl From<String> for NotificationKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "WORD_SAVED" => Self::WordSaved,
            "NEW_MESSAGE" => Self::NewMessage,
            "WORD_FORGOTTEN" => Self::WordForgotten,
            _ => Self::Other(raw),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound message produced by external services
///
/// Messages without a `userId` have no addressee and are dropped by the
/// processor without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Notification category
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Addressee of the notification
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Opaque structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Wrapper for received queue messages with acknowledgment metadata
///
/// The body is kept as the raw string; decoding is the consumer's job so
/// decode failures can be recorded and left unacknowledged.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// The raw message body
    pub body: String,
    /// Receipt handle for acknowledging the message
    pub receipt_handle: String,
    /// Message ID
    pub message_id: String,
}

/// Configuration for queue operations
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Queue URL
    pub queue_url: String,
    /// Default maximum number of messages to retrieve per poll
    pub default_max_messages: i32,
    /// Default visibility timeout for messages (in seconds)
    pub default_visibility_timeout: i32,
    /// Default wait time for long polling (in seconds)
    pub default_wait_time_seconds: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recognized_kinds_map_to_fixed_display_strings() {
        let kind = NotificationKind::from("WORD_SAVED".to_string());
        assert_eq!(kind, NotificationKind::WordSaved);
        assert_eq!(kind.title(), "Palabra guardada");
        assert_eq!(kind.body(), "Se guardó una nueva palabra en tu diccionario.");

        let kind = NotificationKind::from("NEW_MESSAGE".to_string());
        assert_eq!(kind.title(), "Nuevo mensaje");
        assert_eq!(kind.body(), "Tienes un nuevo mensaje.");

        let kind = NotificationKind::from("WORD_FORGOTTEN".to_string());
        assert_eq!(kind.title(), "Palabra olvidada");
        assert_eq!(kind.body(), "Quitaste una palabra de tu diccionario.");
    }

    #[test]
    fn unrecognized_kind_falls_back_to_generic_strings() {
        let kind = NotificationKind::from("UNKNOWN_X".to_string());
        assert_eq!(kind, NotificationKind::Other("UNKNOWN_X".to_string()));
        assert_eq!(kind.title(), "Notificación");
        assert_eq!(kind.body(), "Tienes una nueva notificación.");
        // The raw value survives round-tripping
        assert_eq!(kind.as_str(), "UNKNOWN_X");
    }

    #[test]
    fn inbound_message_decodes_camel_case_wire_json() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"type": "WORD_SAVED", "userId": "u1", "data": {"word": "hola"}}"#,
        )
        .expect("valid message");

        assert_eq!(msg.kind, NotificationKind::WordSaved);
        assert_eq!(msg.user_id.as_deref(), Some("u1"));
        assert_eq!(msg.data, Some(serde_json::json!({"word": "hola"})));
    }

    #[test]
    fn inbound_message_tolerates_missing_user_and_data() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type": "NEW_MESSAGE"}"#).expect("valid message");

        assert_eq!(msg.kind, NotificationKind::NewMessage);
        assert_eq!(msg.user_id, None);
        assert_eq!(msg.data, None);
    }
}
