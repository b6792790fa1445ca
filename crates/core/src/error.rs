use crate::event::EventKind;
use crate::instruction::Panel;

/// A raw chunk did not match any recognized shape.
///
/// Never fatal: the decoder turns it into an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Unknown chunk type: {0}")]
    UnsupportedShape(&'static str),
}

/// Tracking or routing a single chunk failed.
///
/// The stream substitutes a fallback instruction and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ProcessingError {
    #[error("{kind} event cannot be routed to the {panel} panel")]
    PanelMismatch { kind: EventKind, panel: Panel },
}

/// The agent's chunk sequence itself failed; ends the session.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpstreamError {
    #[error("{0}")]
    Agent(String),
    #[error("agent transcript I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl UpstreamError {
    pub fn agent(message: impl Into<String>) -> Self {
        Self::Agent(message.into())
    }
}
