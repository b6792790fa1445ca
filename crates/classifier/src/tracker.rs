//! Block boundary tracking across chunks.
//!
//! Chunks carry only local `start`/`end` flags. [`LaneState`] remembers
//! which lanes are open and where the session is in the code/output cycle,
//! so that the first message after a fully finished execution can be
//! flagged exactly once.

use oibridge_core::{EventKind, ParsedEvent};

/// Progress through one code-execution cycle.
///
/// ```text
/// Idle --code start--> CodeRunning --code end--> AwaitingOutputEnd
///                           |                          |
///                           +------output end----------+--> ReadyForMessage
/// ReadyForMessage --message--> Idle   (fires new_message_after_code)
/// any state --code start--> CodeRunning
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleState {
    #[default]
    Idle,
    CodeRunning,
    AwaitingOutputEnd,
    ReadyForMessage,
}

/// Per-session lane bookkeeping. Owned by exactly one pump at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneState {
    in_code_block: bool,
    in_message_block: bool,
    cycle: CycleState,
}

/// A parsed event plus the boundary hints derived from lane state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub event: ParsedEvent,
    /// A code block opened on this chunk.
    pub new_ui_element: bool,
    /// A code block closed on this chunk.
    pub code_block_completed: bool,
    /// First message after a completed code/output cycle.
    pub new_message_after_code: bool,
}

impl TrackedEvent {
    fn plain(event: ParsedEvent) -> Self {
        Self {
            event,
            new_ui_element: false,
            code_block_completed: false,
            new_message_after_code: false,
        }
    }
}

impl LaneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_code_block(&self) -> bool {
        self.in_code_block
    }

    pub fn in_message_block(&self) -> bool {
        self.in_message_block
    }

    pub fn cycle(&self) -> CycleState {
        self.cycle
    }

    /// A code block has started since the last flagged message.
    pub fn had_code_execution(&self) -> bool {
        self.cycle != CycleState::Idle
    }

    /// The output of the current cycle has ended.
    pub fn code_execution_ended(&self) -> bool {
        self.cycle == CycleState::ReadyForMessage
    }

    /// Advance the lanes by one event.
    pub fn observe(&mut self, event: ParsedEvent) -> TrackedEvent {
        let mut tracked = TrackedEvent::plain(event);
        let start = tracked.event.is_block_start;
        let end = tracked.event.is_block_end;

        match tracked.event.kind {
            EventKind::Code => {
                if start {
                    self.in_code_block = true;
                    self.cycle = CycleState::CodeRunning;
                    tracked.new_ui_element = true;
                }
                if end {
                    self.in_code_block = false;
                    if self.cycle == CycleState::CodeRunning {
                        self.cycle = CycleState::AwaitingOutputEnd;
                    }
                    tracked.code_block_completed = true;
                }
            }
            EventKind::Output => {
                if end
                    && matches!(
                        self.cycle,
                        CycleState::CodeRunning | CycleState::AwaitingOutputEnd
                    )
                {
                    self.cycle = CycleState::ReadyForMessage;
                }
            }
            EventKind::Message => {
                if self.cycle == CycleState::ReadyForMessage {
                    tracked.new_message_after_code = true;
                    self.cycle = CycleState::Idle;
                }
                if start {
                    self.in_message_block = true;
                }
                if end {
                    self.in_message_block = false;
                }
            }
            _ => {}
        }

        tracked
    }
}

/// Functional form of [`LaneState::observe`]: consumes the state and hands
/// back the successor alongside the annotated event.
pub fn track(mut state: LaneState, event: ParsedEvent) -> (TrackedEvent, LaneState) {
    let tracked = state.observe(event);
    (tracked, state)
}
