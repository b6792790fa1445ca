use axum::{Json, extract::State};
use oibridge_core::ResetOutcome;
use serde::{Deserialize, Serialize};

use crate::error::ApiErr;
use crate::state::ConversationStore;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub remaining_messages: usize,
    pub last_message_role: Option<String>,
}

impl From<ResetOutcome> for ResetResponse {
    fn from(outcome: ResetOutcome) -> Self {
        Self {
            success: true,
            remaining_messages: outcome.remaining,
            last_message_role: outcome.last_role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetFromIndexRequest {
    #[serde(default)]
    pub message_index: Option<i64>,
}

/// POST /api/reset: drop the whole conversation.
pub async fn reset(State(conversation): State<ConversationStore>) -> Json<ResetResponse> {
    let outcome = conversation.clear();
    tracing::info!("conversation reset");
    Json(outcome.into())
}

/// POST /api/reset_from_index: keep messages up to and including
/// `message_index`.
pub async fn reset_from_index(
    State(conversation): State<ConversationStore>,
    Json(req): Json<ResetFromIndexRequest>,
) -> Result<Json<ResetResponse>, ApiErr> {
    let index = req
        .message_index
        .ok_or_else(|| ApiErr::bad_request("No message index provided"))?;
    let outcome = conversation.truncate_to(index);
    tracing::info!(index, remaining = outcome.remaining, "conversation truncated");
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oibridge_core::LogMessage;

    fn store_with(n: usize) -> ConversationStore {
        let store = ConversationStore::default();
        for i in 0..n {
            if i % 2 == 0 {
                store.push(LogMessage::user(format!("q{i}")));
            } else {
                store.push(LogMessage::assistant(format!("a{i}")));
            }
        }
        store
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = store_with(3);
        let Json(body) = reset(State(store.clone())).await;
        assert!(body.success);
        assert_eq!(body.remaining_messages, 0);
        assert_eq!(body.last_message_role, None);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn reset_from_index_keeps_prefix() {
        let store = store_with(4);
        let Json(body) = reset_from_index(
            State(store.clone()),
            Json(ResetFromIndexRequest {
                message_index: Some(1),
            }),
        )
        .await
        .expect("truncate");
        assert_eq!(body.remaining_messages, 2);
        assert_eq!(body.last_message_role.as_deref(), Some("assistant"));

        let Json(again) = reset_from_index(
            State(store.clone()),
            Json(ResetFromIndexRequest {
                message_index: Some(1),
            }),
        )
        .await
        .expect("truncate again");
        assert_eq!(again.remaining_messages, 2);
    }

    #[tokio::test]
    async fn negative_index_clears() {
        let store = store_with(2);
        let Json(body) = reset_from_index(
            State(store),
            Json(ResetFromIndexRequest {
                message_index: Some(-1),
            }),
        )
        .await
        .expect("truncate");
        assert_eq!(body.remaining_messages, 0);
    }

    #[tokio::test]
    async fn missing_index_is_rejected() {
        let err = reset_from_index(
            State(store_with(2)),
            Json(ResetFromIndexRequest {
                message_index: None,
            }),
        )
        .await
        .expect_err("missing index");
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "No message index provided");
    }
}
