//! Persistence gateway — the async boundary for board CRUD and invites.
//!
//! DESIGN
//! ======
//! The editor only sees the [`BoardGateway`] trait. `http` talks to the shop
//! REST API; `memory` keeps boards in-process for tests and offline use.
//! Reconciling local ids is the gateway's job: a save returns one issued id
//! per provisional entity so the store can rewrite them.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here retries. `retryable()` only classifies; retrying is left to
//! the user re-triggering the action.

pub mod http;
pub mod memory;


use serde::{Deserialize, Serialize};

use crate::types::{Board, CollaboratorRole, IssuedId};

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("board not found: {0}")]
    NotFound(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected response status {status}")]
    Status { status: u16, body: String },
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_BOARD_NOT_FOUND",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Validation(_) => "E_VALIDATION",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::InvalidUrl(_) => "E_INVALID_URL",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Result of a successful save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    /// One entry per entity that was provisional, in board order.
    #[serde(default)]
    pub issued: Vec<IssuedId>,
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait BoardGateway: Send + Sync {
    async fn get_board_by_id(&self, id: &str) -> Result<Board, GatewayError>;

    /// Persist `board`. Success means the server holds a durable copy.
    async fn save_board(&self, board: &Board) -> Result<SaveReceipt, GatewayError>;

    async fn invite_collaborator(&self, board_id: &str, email: &str, role: CollaboratorRole) -> Result<(), GatewayError>;
}

/// Loose shape check; the server owns real validation.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}
