//! Bundled agent collaborator.
//!
//! Model invocation is not part of this server. Sessions are driven by a
//! recorded JSONL transcript of raw agent chunks when one is configured, or
//! by a short canned reply otherwise.

use oibridge_core::{RawChunk, UpstreamError};
use oibridge_runtime_config::BridgeConfig;
use oibridge_stream::{ChunkSource, JsonlReplaySource, ScriptedSource};
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayAgent;

impl ReplayAgent {
    /// Start a run for `prompt`. Failing to open the transcript surfaces as
    /// an upstream failure on the session stream rather than an HTTP error.
    pub async fn start(&self, prompt: &str, config: &BridgeConfig) -> AgentSource {
        let Some(path) = config.stream.replay_path.as_deref() else {
            return AgentSource::Scripted(canned_reply(prompt, config));
        };
        let delay = Duration::from_millis(config.stream.replay_delay_ms);
        match JsonlReplaySource::open(path, delay).await {
            Ok(source) => AgentSource::Replay(source),
            Err(e) => {
                tracing::error!("open transcript {}: {e}", path.display());
                AgentSource::Scripted(ScriptedSource::new([Err(UpstreamError::Io(e))]))
            }
        }
    }
}

fn canned_reply(prompt: &str, config: &BridgeConfig) -> ScriptedSource {
    let text = format!(
        "No agent transcript is configured for {}. You said: {prompt}",
        config.agent.resolved_model()
    );
    ScriptedSource::from_chunks([
        RawChunk::from_value(json!({
            "role": "assistant", "type": "message", "start": true,
        })),
        RawChunk::from_value(json!({
            "role": "assistant", "type": "message", "content": text,
        })),
        RawChunk::from_value(json!({
            "role": "assistant", "type": "message", "end": true,
        })),
    ])
}

pub enum AgentSource {
    Replay(JsonlReplaySource),
    Scripted(ScriptedSource),
}

impl ChunkSource for AgentSource {
    async fn next_chunk(&mut self) -> Option<Result<RawChunk, UpstreamError>> {
        match self {
            Self::Replay(source) => source.next_chunk().await,
            Self::Scripted(source) => source.next_chunk().await,
        }
    }
}
