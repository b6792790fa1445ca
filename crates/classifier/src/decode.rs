//! Raw chunk decoding.
//!
//! Turns whatever the agent yielded into exactly one [`ParsedEvent`].
//! Decoding is total: unknown shapes degrade to an `error` event and bare
//! text degrades to a `message`.

use oibridge_core::{
    DecodeError, EventKind, ParsedEvent, RawChunk, render_content, value_shape,
};
use serde_json::{Map, Value};
use tracing::debug;

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

const DEFAULT_ROLE: &str = "assistant";
const DEFAULT_TYPE: &str = "message";

/// Decode one raw chunk.
pub fn decode(raw: &RawChunk) -> ParsedEvent {
    match raw {
        RawChunk::Text(text) => decode_text(text),
        RawChunk::Record(record) => decode_record(record),
        RawChunk::Other(value) => {
            let err = DecodeError::UnsupportedShape(value_shape(value));
            debug!("undecodable chunk: {err}");
            ParsedEvent::error(err.to_string())
        }
    }
}

fn decode_text(text: &str) -> ParsedEvent {
    if text.trim_start().starts_with('{') {
        if let Ok(Value::Object(record)) = serde_json::from_str::<Value>(text) {
            return decode_record(&record);
        }
    }
    if let Some(marker) = thinking_marker(text) {
        return marker;
    }
    ParsedEvent::new(EventKind::Message, text).with_thinking(mentions_thinking(text))
}

fn decode_record(record: &Map<String, Value>) -> ParsedEvent {
    let role = field_text(record, "role").unwrap_or_else(|| DEFAULT_ROLE.to_string());
    let chunk_type = field_text(record, "type").unwrap_or_else(|| DEFAULT_TYPE.to_string());
    let format = field_text(record, "format").filter(|f| !f.is_empty());
    let raw_content = record.get("content");
    let content = raw_content.map(render_content).unwrap_or_default();

    // Only string content can be a thinking marker.
    let textual = matches!(raw_content, Some(Value::String(_)));
    if textual {
        if let Some(marker) = thinking_marker(&content) {
            return marker;
        }
    }
    let thinking = textual && mentions_thinking(&content);

    let start = flag(record, "start");
    let end = flag(record, "end");

    match (role.as_str(), chunk_type.as_str()) {
        ("assistant", "code") => {
            let language = format
                .or_else(|| field_text(record, "language"))
                .unwrap_or_default();
            ParsedEvent::new(EventKind::Code, content)
                .with_language(language)
                .with_block_flags(start, end)
        }
        ("computer", "console") => match format.as_deref() {
            Some("output") => {
                ParsedEvent::new(EventKind::Output, content).with_block_flags(start, end)
            }
            _ => ParsedEvent::new(EventKind::Console, content)
                .with_console_format(format)
                .with_block_flags(start, end),
        },
        ("assistant", "message") => ParsedEvent::new(EventKind::Message, content)
            .with_block_flags(start, end)
            .with_thinking(thinking),
        _ => {
            debug!("unknown chunk format - role: {role}, type: {chunk_type}");
            ParsedEvent::new(EventKind::from_type(&chunk_type), content)
                .with_block_flags(start, end)
                .with_thinking(thinking)
                .with_role(role)
        }
    }
}

/// A chunk whose whole trimmed content is a marker opens or closes a
/// thinking span.
fn thinking_marker(content: &str) -> Option<ParsedEvent> {
    match content.trim() {
        THINK_OPEN => Some(ParsedEvent::thinking_start()),
        THINK_CLOSE => Some(ParsedEvent::thinking_end()),
        _ => None,
    }
}

fn mentions_thinking(content: &str) -> bool {
    content.contains(THINK_OPEN) || content.contains(THINK_CLOSE)
}

/// Read a field as text; null and missing both count as absent.
fn field_text(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn flag(record: &Map<String, Value>, key: &str) -> bool {
    record.get(key).and_then(Value::as_bool).unwrap_or(false)
}
