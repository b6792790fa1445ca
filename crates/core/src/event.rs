use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single decoded chunk.
///
/// Known agent shapes map onto the fixed variants; any other `type` string
/// seen on a record is preserved in [`EventKind::Other`] so the UI can still
/// show it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    Message,
    Code,
    Output,
    Console,
    ThinkingStart,
    ThinkingEnd,
    Error,
    Other(String),
}

impl EventKind {
    /// Map a raw `type` string onto a kind.
    pub fn from_type(raw: &str) -> Self {
        match raw {
            "message" => Self::Message,
            "code" => Self::Code,
            "output" => Self::Output,
            "console" => Self::Console,
            "thinking_start" => Self::ThinkingStart,
            "thinking_end" => Self::ThinkingEnd,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Message => "message",
            Self::Code => "code",
            Self::Output => "output",
            Self::Console => "console",
            Self::ThinkingStart => "thinking_start",
            Self::ThinkingEnd => "thinking_end",
            Self::Error => "error",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_thinking_marker(&self) -> bool {
        matches!(self, Self::ThinkingStart | Self::ThinkingEnd)
    }
}

impl From<String> for EventKind {
    fn from(raw: String) -> Self {
        Self::from_type(&raw)
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw chunk after decoding, before block tracking.
///
/// `is_block_start`/`is_block_end` are copied from the source chunk and are
/// not yet reconciled with the session's lane state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvent {
    pub kind: EventKind,
    pub content: String,
    /// Only set for `code` events decoded from an assistant code chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Only set for `console` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_format: Option<String>,
    #[serde(default)]
    pub is_block_start: bool,
    #[serde(default)]
    pub is_block_end: bool,
    /// Content mentions a thinking marker without being one.
    #[serde(default)]
    pub thinking: bool,
    /// Source role, kept on passthrough events for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ParsedEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        let content = if kind.is_thinking_marker() {
            String::new()
        } else {
            content.into()
        };
        Self {
            kind,
            content,
            language: None,
            console_format: None,
            is_block_start: false,
            is_block_end: false,
            thinking: false,
            role: None,
        }
    }

    pub fn thinking_start() -> Self {
        let mut event = Self::new(EventKind::ThinkingStart, "");
        event.thinking = true;
        event
    }

    pub fn thinking_end() -> Self {
        let mut event = Self::new(EventKind::ThinkingEnd, "");
        event.thinking = true;
        event
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, message)
    }

    pub fn with_block_flags(mut self, start: bool, end: bool) -> Self {
        self.is_block_start = start;
        self.is_block_end = end;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_console_format(mut self, format: Option<String>) -> Self {
        self.console_format = format;
        self
    }

    pub fn with_thinking(mut self, thinking: bool) -> Self {
        self.thinking = thinking;
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_type_strings() {
        for raw in [
            "message",
            "code",
            "output",
            "console",
            "thinking_start",
            "thinking_end",
            "error",
        ] {
            assert_eq!(EventKind::from_type(raw).as_str(), raw);
        }
        assert_eq!(
            EventKind::from_type("confirmation"),
            EventKind::Other("confirmation".into())
        );
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&EventKind::ThinkingStart).unwrap();
        assert_eq!(json, "\"thinking_start\"");
        let other: EventKind = serde_json::from_str("\"review\"").unwrap();
        assert_eq!(other, EventKind::Other("review".into()));
    }

    #[test]
    fn thinking_markers_never_carry_content() {
        let event = ParsedEvent::new(EventKind::ThinkingEnd, "leftover");
        assert!(event.content.is_empty());
        assert!(ParsedEvent::thinking_start().content.is_empty());
    }
}
