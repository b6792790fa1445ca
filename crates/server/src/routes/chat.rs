use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use oibridge_core::{EventKind, LogMessage, Panel, StreamItem, UIInstruction};
use oibridge_stream::spawn_session;
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};

use crate::error::ApiErr;
use crate::state::{AppState, ConversationStore};

pub const SESSION_ID_HEADER: &str = "x-session-id";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// POST /api/chat: run one agent session and stream its UI instructions
/// as server-sent events, ending with `data: [DONE]`.
///
/// Each request gets a fresh session channel; disconnecting drops the
/// receiver, which stops the producer.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ApiErr> {
    let prompt = req
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiErr::bad_request("No prompt provided"))?;

    let config = state.config.current();
    state.conversation.push(LogMessage::user(prompt));

    let source = state.agent.start(prompt, &config).await;
    let (session_id, rx, _producer) =
        spawn_session(source, config.stream.channel_capacity).into_parts();
    tracing::info!(session = %session_id, model = %config.agent.resolved_model(), "chat session started");

    let mut recorder = TranscriptRecorder::new(state.conversation.clone());
    let events = ReceiverStream::new(rx).map(move |item| {
        recorder.observe(&item);
        Ok::<_, Infallible>(sse_event(&item))
    });

    Ok((
        [(SESSION_ID_HEADER, session_id)],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response())
}

fn sse_event(item: &StreamItem) -> Event {
    match item.sse_data() {
        Ok(data) => Event::default().data(data),
        Err(e) => {
            tracing::error!("serialize stream item: {e}");
            Event::default().data(serde_json::json!({"kind": "error", "content": e.to_string()}).to_string())
        }
    }
}

/// Records a session's reply into the conversation log, one entry per
/// message, code or console block.
struct TranscriptRecorder {
    conversation: ConversationStore,
    current: Option<PendingEntry>,
}

struct PendingEntry {
    lane: Lane,
    format: Option<String>,
    content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Message,
    Code,
    Console,
}

impl Lane {
    fn of(instruction: &UIInstruction) -> Option<Self> {
        match (&instruction.kind, instruction.panel) {
            (EventKind::Message, Panel::Chat) => Some(Self::Message),
            (EventKind::Code, _) => Some(Self::Code),
            (EventKind::Output, _) => Some(Self::Console),
            // Bare console start/end markers bracket the output block.
            (EventKind::Console, _) if instruction.console_format.is_none() => Some(Self::Console),
            _ => None,
        }
    }

    fn log_message(self, content: String, format: Option<String>) -> LogMessage {
        match self {
            Self::Message => LogMessage::assistant(content),
            Self::Code => LogMessage::assistant(content)
                .with_type("code")
                .with_format(format),
            Self::Console => LogMessage::new("computer", content)
                .with_type("console")
                .with_format(Some("output".to_string())),
        }
    }
}

impl TranscriptRecorder {
    fn new(conversation: ConversationStore) -> Self {
        Self {
            conversation,
            current: None,
        }
    }

    fn observe(&mut self, item: &StreamItem) {
        let StreamItem::Instruction(instruction) = item else {
            self.flush();
            return;
        };
        let Some(lane) = Lane::of(instruction) else {
            return;
        };
        let continues = self
            .current
            .as_ref()
            .is_some_and(|entry| entry.lane == lane && !instruction.is_block_start);
        if !continues {
            self.flush();
        }

        let entry = self.current.get_or_insert_with(|| PendingEntry {
            lane,
            format: None,
            content: String::new(),
        });
        entry.content.push_str(&instruction.content);
        if entry.format.is_none() {
            entry.format = instruction.language.clone().filter(|l| !l.is_empty());
        }

        if instruction.is_block_end {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let Some(entry) = self.current.take() else {
            return;
        };
        if entry.content.trim().is_empty() {
            return;
        }
        self.conversation
            .push(entry.lane.log_message(entry.content, entry.format));
    }
}
