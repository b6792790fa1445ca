pub mod chat;
pub mod health;
pub mod history;
pub mod reset;
pub mod settings;

use serde::Serialize;

/// `{"success": true}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub success: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
