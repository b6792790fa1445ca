use axum::{Json, extract::State};
use oibridge_core::LogMessage;

use crate::state::ConversationStore;

/// GET /api/history: the conversation so far, oldest first.
pub async fn history(State(conversation): State<ConversationStore>) -> Json<Vec<LogMessage>> {
    Json(conversation.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_lists_messages_in_order() {
        let conversation = ConversationStore::default();
        conversation.push(LogMessage::user("hello"));
        conversation.push(LogMessage::assistant("hi there"));

        let Json(messages) = history(State(conversation)).await;
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant"]);
    }
}
