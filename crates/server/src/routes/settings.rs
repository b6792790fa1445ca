use axum::{Json, extract::State};
use oibridge_runtime_config::{AgentSettings, AgentUpdate};
use serde::Serialize;

use super::OkResponse;
use crate::error::ApiErr;
use crate::state::SharedConfig;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub model: String,
    pub custom: bool,
    pub context_window: u32,
    pub max_tokens: u32,
    pub auto_run: bool,
    pub api_base: String,
}

impl From<&AgentSettings> for SettingsResponse {
    fn from(agent: &AgentSettings) -> Self {
        Self {
            model: agent.model.clone(),
            custom: agent.custom,
            context_window: agent.context_window,
            max_tokens: agent.max_tokens,
            auto_run: agent.auto_run,
            api_base: agent.effective_api_base().to_string(),
        }
    }
}

/// GET /api/settings
pub async fn get_settings(State(config): State<SharedConfig>) -> Json<SettingsResponse> {
    Json(SettingsResponse::from(&config.current().agent))
}

/// POST /api/settings: apply a partial update. Sessions already running
/// keep the snapshot they started with.
pub async fn update_settings(
    State(config): State<SharedConfig>,
    Json(update): Json<AgentUpdate>,
) -> Result<Json<OkResponse>, ApiErr> {
    let next = config.current().with_agent_update(&update);
    next.validate()
        .map_err(|e| ApiErr::bad_request(e.to_string()))?;
    tracing::info!(
        model = %next.agent.resolved_model(),
        context_window = next.agent.context_window,
        max_tokens = next.agent.max_tokens,
        auto_run = next.agent.auto_run,
        "agent settings updated"
    );
    config.replace(next);
    Ok(Json(OkResponse::ok()))
}
