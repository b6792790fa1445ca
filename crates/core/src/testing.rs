use crate::RawChunk;
use serde_json::{Value, json};

/// Arbitrary record chunk.
pub fn record(value: Value) -> RawChunk {
    RawChunk::from_value(value)
}

/// Assistant code chunk with the given language and block flags.
pub fn code(language: &str, content: &str, start: bool, end: bool) -> RawChunk {
    record(json!({
        "role": "assistant",
        "type": "code",
        "format": language,
        "content": content,
        "start": start,
        "end": end,
    }))
}

pub fn code_start(language: &str) -> RawChunk {
    code(language, "", true, false)
}

pub fn code_end() -> RawChunk {
    record(json!({"role": "assistant", "type": "code", "end": true}))
}

/// Computer console chunk with an explicit format.
pub fn console(format: &str, content: &str, start: bool, end: bool) -> RawChunk {
    record(json!({
        "role": "computer",
        "type": "console",
        "format": format,
        "content": content,
        "start": start,
        "end": end,
    }))
}

pub fn output_start() -> RawChunk {
    console("output", "", true, false)
}

pub fn output(content: &str) -> RawChunk {
    console("output", content, false, false)
}

pub fn output_end() -> RawChunk {
    console("output", "", false, true)
}

pub fn active_line(line: u32) -> RawChunk {
    record(json!({
        "role": "computer",
        "type": "console",
        "format": "active_line",
        "content": line,
    }))
}

/// Assistant message chunk.
pub fn message(content: &str, start: bool, end: bool) -> RawChunk {
    record(json!({
        "role": "assistant",
        "type": "message",
        "content": content,
        "start": start,
        "end": end,
    }))
}

pub fn message_start(content: &str) -> RawChunk {
    message(content, true, false)
}

/// A full code/output cycle: code start, body, code end, output start,
/// output body, output end.
pub fn code_cycle(language: &str, source: &str, result: &str) -> Vec<RawChunk> {
    vec![
        code_start(language),
        code(language, source, false, false),
        code_end(),
        output_start(),
        output(result),
        output_end(),
    ]
}
