//! Agent chunk sources.
//!
//! The agent loop itself is external; the pump only needs an ordered,
//! cancellable sequence of raw chunks that may fail part way through.

use oibridge_core::{RawChunk, UpstreamError};
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Record key that makes a replayed transcript line fail the session.
pub const UPSTREAM_ERROR_KEY: &str = "__upstream_error";

/// Ordered source of raw agent chunks.
///
/// `None` means the agent finished; `Some(Err(_))` means the agent sequence
/// itself failed and will yield nothing further.
pub trait ChunkSource: Send {
    fn next_chunk(&mut self) -> impl Future<Output = Option<Result<RawChunk, UpstreamError>>> + Send;
}

/// Pre-recorded sequence, mostly for tests and canned replies.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    items: VecDeque<Result<RawChunk, UpstreamError>>,
}

impl ScriptedSource {
    pub fn new(items: impl IntoIterator<Item = Result<RawChunk, UpstreamError>>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn from_chunks(chunks: impl IntoIterator<Item = RawChunk>) -> Self {
        Self::new(chunks.into_iter().map(Ok))
    }

    /// Yields `chunks`, then fails with `error`.
    pub fn failing_after(chunks: impl IntoIterator<Item = RawChunk>, error: UpstreamError) -> Self {
        let mut source = Self::from_chunks(chunks);
        source.items.push_back(Err(error));
        source
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl ChunkSource for ScriptedSource {
    async fn next_chunk(&mut self) -> Option<Result<RawChunk, UpstreamError>> {
        self.items.pop_front()
    }
}

/// Chunks pushed by another task; ends when every sender is dropped.
impl ChunkSource for mpsc::Receiver<Result<RawChunk, UpstreamError>> {
    async fn next_chunk(&mut self) -> Option<Result<RawChunk, UpstreamError>> {
        self.recv().await
    }
}

impl ChunkSource for mpsc::UnboundedReceiver<Result<RawChunk, UpstreamError>> {
    async fn next_chunk(&mut self) -> Option<Result<RawChunk, UpstreamError>> {
        self.recv().await
    }
}

/// Replays a JSONL transcript of raw chunks.
///
/// Each non-blank line is one chunk: valid JSON is taken as-is, anything
/// else (including bytes that are not UTF-8) is delivered as scalar text. A
/// record carrying [`UPSTREAM_ERROR_KEY`] simulates an agent failure.
pub struct JsonlReplaySource {
    reader: BufReader<File>,
    buf: Vec<u8>,
    delay: Duration,
    failed: bool,
}

impl JsonlReplaySource {
    pub async fn open(path: &Path, delay: Duration) -> std::io::Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            reader: BufReader::new(file),
            buf: Vec::new(),
            delay,
            failed: false,
        })
    }
}

impl JsonlReplaySource {
    /// Next raw line without its terminator, decoded lossily.
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        let line = self.buf.strip_suffix(b"\n").unwrap_or(&self.buf[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }
}

impl ChunkSource for JsonlReplaySource {
    async fn next_chunk(&mut self) -> Option<Result<RawChunk, UpstreamError>> {
        if self.failed {
            return None;
        }
        loop {
            let line = match self.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(UpstreamError::Io(e)));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            return Some(match parse_transcript_line(&line) {
                Ok(chunk) => Ok(chunk),
                Err(e) => {
                    self.failed = true;
                    Err(e)
                }
            });
        }
    }
}

fn parse_transcript_line(line: &str) -> Result<RawChunk, UpstreamError> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => match record.get(UPSTREAM_ERROR_KEY) {
            Some(reason) => Err(UpstreamError::agent(
                reason.as_str().map_or_else(|| reason.to_string(), str::to_string),
            )),
            None => Ok(RawChunk::Record(record)),
        },
        Ok(value) => Ok(RawChunk::from_value(value)),
        Err(_) => Ok(RawChunk::Text(line.to_string())),
    }
}
