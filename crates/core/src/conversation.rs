//! In-memory conversation log.
//!
//! The classifier never touches this; it is owned by whoever drives the
//! agent and only supports append, full clear and prefix truncation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub role: String,
    #[serde(rename = "type")]
    pub message_type: String,
    /// Code language, or the console stream for `console` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl LogMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            message_type: "message".to_string(),
            format: None,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    pub fn with_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = message_type.into();
        self
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }
}

/// Result of a reset, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetOutcome {
    pub remaining: usize,
    pub last_role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<LogMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: LogMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[LogMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) -> ResetOutcome {
        self.messages.clear();
        self.outcome()
    }

    /// Keep messages up to and including `index`.
    ///
    /// A negative index clears the log; an index past the end keeps
    /// everything. Repeating the same call leaves the log unchanged.
    pub fn truncate_to(&mut self, index: i64) -> ResetOutcome {
        if index < 0 || self.messages.is_empty() {
            return self.clear();
        }
        let last = usize::try_from(index)
            .unwrap_or(usize::MAX)
            .min(self.messages.len() - 1);
        self.messages.truncate(last + 1);
        self.outcome()
    }

    fn outcome(&self) -> ResetOutcome {
        ResetOutcome {
            remaining: self.messages.len(),
            last_role: self.messages.last().map(|m| m.role.clone()),
        }
    }
}
