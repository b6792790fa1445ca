use axum::extract::FromRef;
use oibridge_core::{ConversationLog, LogMessage, ResetOutcome};
use oibridge_runtime_config::BridgeConfig;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crate::agent::ReplayAgent;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub conversation: ConversationStore,
    pub agent: ReplayAgent,
}

impl AppState {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: SharedConfig::new(config),
            conversation: ConversationStore::default(),
            agent: ReplayAgent,
        }
    }
}

impl FromRef<AppState> for SharedConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for ConversationStore {
    fn from_ref(state: &AppState) -> Self {
        state.conversation.clone()
    }
}

/// Current configuration snapshot.
///
/// Sessions take an `Arc` of the snapshot when they start; a settings update
/// swaps in a new value without touching running sessions.
#[derive(Clone)]
pub struct SharedConfig {
    current: Arc<RwLock<Arc<BridgeConfig>>>,
}

impl SharedConfig {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    pub fn current(&self) -> Arc<BridgeConfig> {
        Arc::clone(&self.current.read().expect("config lock poisoned"))
    }

    pub fn replace(&self, config: BridgeConfig) {
        *self.current.write().expect("config lock poisoned") = Arc::new(config);
    }
}

/// The in-memory conversation log.
#[derive(Clone, Default)]
pub struct ConversationStore {
    log: Arc<Mutex<ConversationLog>>,
}

impl ConversationStore {
    fn lock(&self) -> MutexGuard<'_, ConversationLog> {
        self.log.lock().expect("conversation mutex poisoned")
    }

    pub fn push(&self, message: LogMessage) {
        self.lock().push(message);
    }

    pub fn snapshot(&self) -> Vec<LogMessage> {
        self.lock().messages().to_vec()
    }

    pub fn clear(&self) -> ResetOutcome {
        self.lock().clear()
    }

    pub fn truncate_to(&self, index: i64) -> ResetOutcome {
        self.lock().truncate_to(index)
    }
}
