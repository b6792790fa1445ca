//! Stream pump for interpreter sessions.
//!
//! Wires an agent [`ChunkSource`] through the classifier onto a per-session
//! channel of [`StreamItem`](oibridge_core::StreamItem)s, terminated by
//! exactly one end-of-stream sentinel.

pub mod pump;
pub mod source;

pub use pump::{PumpOutcome, PumpReport, SessionStream, run, run_with, spawn_session};
pub use source::{ChunkSource, JsonlReplaySource, ScriptedSource, UPSTREAM_ERROR_KEY};
