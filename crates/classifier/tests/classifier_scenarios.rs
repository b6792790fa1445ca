use oibridge_classifier::{Classifier, CycleState};
use oibridge_core::testing::{self, code_cycle};
use oibridge_core::{EventKind, Panel, RawChunk, UIInstruction};
use serde_json::json;

fn classify_all(chunks: &[RawChunk]) -> Vec<UIInstruction> {
    let mut classifier = Classifier::new();
    chunks
        .iter()
        .map(|chunk| classifier.process(chunk).expect("chunk should classify"))
        .collect()
}

#[test]
fn code_chunk_routes_to_code_panel() {
    let chunk = testing::record(json!({
        "role": "assistant",
        "type": "code",
        "format": "py",
        "content": "print(1)",
        "start": true,
    }));
    let instruction = Classifier::new().process(&chunk).unwrap();
    assert_eq!(instruction.kind, EventKind::Code);
    assert_eq!(instruction.panel, Panel::Code);
    assert!(instruction.suppress_chat);
    assert!(instruction.starts_new_unit);
    assert_eq!(instruction.language.as_deref(), Some("py"));
}

#[test]
fn message_after_completed_cycle_is_flagged_once() {
    let chunks = vec![
        testing::code_start("python"),
        testing::code_end(),
        testing::console("output", "", true, false),
        testing::output_end(),
        testing::message_start("Done"),
        testing::message_start("Again"),
    ];
    let instructions = classify_all(&chunks);

    assert_eq!(instructions.len(), chunks.len());
    assert!(instructions[4].new_message_after_code);
    assert_eq!(instructions[4].content, "Done");
    assert!(!instructions[5].new_message_after_code);
}

#[test]
fn bare_think_marker_becomes_thinking_start() {
    let instruction = Classifier::new()
        .process(&RawChunk::from_text("<think>"))
        .unwrap();
    assert_eq!(instruction.kind, EventKind::ThinkingStart);
    assert_eq!(instruction.content, "");
    assert_eq!(instruction.panel, Panel::Chat);
}

#[test]
fn unrecognized_record_is_non_fatal_chat_passthrough() {
    let mut classifier = Classifier::new();
    let instruction = classifier
        .process(&testing::record(json!({"foo": "bar"})))
        .unwrap();
    assert_eq!(instruction.panel, Panel::Chat);
    assert!(!instruction.suppress_chat);

    // The session keeps going afterwards.
    let next = classifier.process(&testing::code_start("js")).unwrap();
    assert_eq!(next.panel, Panel::Code);
}

#[test]
fn flag_fires_only_for_messages_after_each_cycle() {
    let mut chunks = Vec::new();
    chunks.push(testing::message_start("Let me check."));
    chunks.extend(code_cycle("python", "print(2)", "2\n"));
    chunks.push(RawChunk::from_text("<think>"));
    chunks.push(RawChunk::from_text("</think>"));
    chunks.push(testing::message_start("It printed 2."));
    chunks.push(testing::message("Anything else?", false, true));
    chunks.extend(code_cycle("shell", "ls", "a b\n"));
    chunks.push(testing::message_start("Listed."));

    let instructions = classify_all(&chunks);
    let flagged: Vec<&str> = instructions
        .iter()
        .filter(|i| i.new_message_after_code)
        .map(|i| i.content.as_str())
        .collect();
    assert_eq!(flagged, vec!["It printed 2.", "Listed."]);
    assert!(
        instructions
            .iter()
            .filter(|i| i.new_message_after_code)
            .all(|i| i.kind == EventKind::Message)
    );
}

#[test]
fn every_instruction_respects_panel_invariant() {
    let mut chunks = code_cycle("python", "x", "y");
    chunks.push(testing::active_line(1));
    chunks.push(RawChunk::from_value(json!(null)));
    chunks.push(testing::record(json!({"role": "user", "type": "image", "content": "..."})));
    chunks.push(RawChunk::from_text("plain"));

    for instruction in classify_all(&chunks) {
        match instruction.panel {
            Panel::Code => assert_eq!(instruction.kind, EventKind::Code),
            Panel::Output => assert!(matches!(
                instruction.kind,
                EventKind::Output | EventKind::Console
            )),
            Panel::Chat => assert!(!matches!(
                instruction.kind,
                EventKind::Code | EventKind::Output | EventKind::Console
            )),
        }
    }
}

#[test]
fn lanes_reflect_open_blocks() {
    let mut classifier = Classifier::new();
    classifier.process(&testing::code_start("py")).unwrap();
    assert!(classifier.lanes().in_code_block());
    classifier.process(&testing::code_end()).unwrap();
    classifier.process(&testing::output_end()).unwrap();
    assert_eq!(classifier.lanes().cycle(), CycleState::ReadyForMessage);
    assert_eq!(classifier.processed(), 3);
}
