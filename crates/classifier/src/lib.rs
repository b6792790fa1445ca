//! Interpreter output stream classifier.
//!
//! A [`Classifier`] owns one session's [`LaneState`] and turns each raw
//! chunk into a [`UIInstruction`] in a single pass:
//! decode -> track -> route.

pub mod decode;
pub mod router;
pub mod tracker;

use oibridge_core::{ProcessingError, RawChunk, UIInstruction};
use tracing::trace;

pub use decode::decode;
pub use router::route;
pub use tracker::{CycleState, LaneState, TrackedEvent, track};

/// Per-session classifier. Not shared between sessions.
#[derive(Debug, Default)]
pub struct Classifier {
    lanes: LaneState,
    processed: u64,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one chunk, advancing the session's lane state.
    pub fn process(&mut self, raw: &RawChunk) -> Result<UIInstruction, ProcessingError> {
        let event = decode(raw);
        let tracked = self.lanes.observe(event);
        let instruction = route(&tracked);
        instruction.check_panel()?;
        self.processed += 1;
        trace!(
            seq = self.processed,
            kind = %instruction.kind,
            panel = %instruction.panel,
            "classified chunk"
        );
        Ok(instruction)
    }

    pub fn lanes(&self) -> &LaneState {
        &self.lanes
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }
}
