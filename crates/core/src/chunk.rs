use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One raw value yielded by the execution agent.
///
/// The agent emits either bare text or a loosely-typed record with optional
/// `role`, `type`, `content`, `format`, `start` and `end` fields. Anything
/// else (numbers, arrays, null) is kept as-is so the decoder can report it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawChunk {
    Text(String),
    Record(Map<String, Value>),
    Other(Value),
}

impl RawChunk {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(record) => Self::Record(record),
            other => Self::Other(other),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Short label for the chunk's shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Record(_) => "record",
            Self::Other(value) => value_shape(value),
        }
    }

    /// Best-effort text payload, used when a chunk has to be forwarded
    /// without classification.
    pub fn raw_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Record(record) => record.get("content").map(render_content).unwrap_or_default(),
            Self::Other(value) => render_content(value),
        }
    }
}

impl From<Value> for RawChunk {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<&str> for RawChunk {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawChunk {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<'de> Deserialize<'de> for RawChunk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Render an arbitrary JSON content field as display text.
///
/// Strings pass through untouched, null becomes empty, containers are
/// pretty-printed and scalars use their JSON form.
pub fn render_content(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

pub fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "record",
    }
}
