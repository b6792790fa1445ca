use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chunk::RawChunk;
use crate::error::{ProcessingError, UpstreamError};
use crate::event::EventKind;

/// Payload sent in place of an instruction to mark the end of a session.
pub const END_OF_STREAM_DATA: &str = "[DONE]";

/// UI destination for an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Chat,
    Code,
    Output,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Code => "code",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally visible unit: one per processed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UIInstruction {
    pub kind: EventKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub panel: Panel,
    /// Must not be echoed into the chat transcript.
    pub suppress_chat: bool,
    /// The UI must open a new visual block for this instruction.
    pub starts_new_unit: bool,
    /// First message after a fully completed code/output cycle.
    pub new_message_after_code: bool,
    /// A code block started on this chunk.
    #[serde(rename = "newUIElement")]
    pub new_ui_element: bool,
    /// A code block ended on this chunk.
    pub code_block_completed: bool,
    pub is_block_start: bool,
    pub is_block_end: bool,
    pub thinking: bool,
}

impl UIInstruction {
    /// A plain chat instruction with every hint cleared.
    pub fn chat(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            language: None,
            console_format: None,
            role: None,
            panel: Panel::Chat,
            suppress_chat: false,
            starts_new_unit: false,
            new_message_after_code: false,
            new_ui_element: false,
            code_block_completed: false,
            is_block_start: false,
            is_block_end: false,
            thinking: false,
        }
    }

    /// Minimal passthrough used when a chunk could not be processed.
    pub fn fallback(raw: &RawChunk) -> Self {
        Self::chat(EventKind::Message, raw.raw_content())
    }

    /// Terminal error emitted when the agent sequence itself fails.
    pub fn upstream_error(err: &UpstreamError) -> Self {
        Self::chat(EventKind::Error, err.to_string())
    }

    /// Check that the panel agrees with the event kind.
    ///
    /// `code` goes to the code panel, `output`/`console` to the output panel,
    /// everything else to chat.
    pub fn check_panel(&self) -> Result<(), ProcessingError> {
        let expected = match self.kind {
            EventKind::Code => Panel::Code,
            EventKind::Output | EventKind::Console => Panel::Output,
            _ => Panel::Chat,
        };
        if self.panel == expected {
            Ok(())
        } else {
            Err(ProcessingError::PanelMismatch {
                kind: self.kind.clone(),
                panel: self.panel,
            })
        }
    }
}

/// One item on a session's delivery channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Instruction(UIInstruction),
    /// End-of-stream sentinel; always the last item of a session.
    End,
}

impl StreamItem {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn instruction(&self) -> Option<&UIInstruction> {
        match self {
            Self::Instruction(instruction) => Some(instruction),
            Self::End => None,
        }
    }

    /// Payload for a server-sent `data:` field.
    pub fn sse_data(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Instruction(instruction) => serde_json::to_string(instruction),
            Self::End => Ok(END_OF_STREAM_DATA.to_string()),
        }
    }
}
