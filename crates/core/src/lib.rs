//! Core types for the interpreter web bridge.
//!
//! Raw agent chunks enter as [`RawChunk`], are classified into a
//! [`ParsedEvent`], and leave as a [`UIInstruction`] wrapped in a
//! [`StreamItem`]. Classification itself lives in `oibridge-classifier`.

pub mod chunk;
pub mod conversation;
pub mod error;
pub mod event;
pub mod instruction;

pub use chunk::*;
pub use conversation::{ConversationLog, LogMessage, ResetOutcome};
pub use error::{DecodeError, ProcessingError, UpstreamError};
pub use event::*;
pub use instruction::*;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
