//! Panel routing. Stateless: the same tracked event always yields the same
//! instruction.

use oibridge_core::{EventKind, Panel, UIInstruction};

use crate::tracker::TrackedEvent;

pub fn route(tracked: &TrackedEvent) -> UIInstruction {
    let event = &tracked.event;
    let (panel, suppress_chat, starts_new_unit) = match event.kind {
        EventKind::Code => (Panel::Code, true, event.is_block_start),
        EventKind::Output | EventKind::Console => (Panel::Output, true, false),
        _ => (Panel::Chat, false, event.is_block_start),
    };

    UIInstruction {
        kind: event.kind.clone(),
        content: event.content.clone(),
        language: event.language.clone(),
        console_format: event.console_format.clone(),
        role: event.role.clone(),
        panel,
        suppress_chat,
        starts_new_unit,
        new_message_after_code: tracked.new_message_after_code,
        new_ui_element: tracked.new_ui_element,
        code_block_completed: tracked.code_block_completed,
        is_block_start: event.is_block_start,
        is_block_end: event.is_block_end,
        thinking: event.thinking,
    }
}
