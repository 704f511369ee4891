//! In-process gateway. Boards live in a `RwLock`-guarded map; saves issue
//! UUIDs for provisional ids the way the server does.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{BoardGateway, GatewayError, SaveReceipt, is_plausible_email};
use crate::types::{Board, CollaboratorRole, EntityId, IssuedId};

/// An invitation recorded by [`InMemoryGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invitation {
    pub board_id: String,
    pub email: String,
    pub role: CollaboratorRole,
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    boards: RwLock<HashMap<String, Board>>,
    invitations: RwLock<Vec<Invitation>>,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_boards(boards: impl IntoIterator<Item = Board>) -> Self {
        let boards = boards.into_iter().map(|board| (board.id.clone(), board)).collect();
        Self { boards: RwLock::new(boards), invitations: RwLock::new(Vec::new()) }
    }

    /// Stored copy of a board, as last saved.
    pub async fn board(&self, id: &str) -> Option<Board> {
        self.boards.read().await.get(id).cloned()
    }

    pub async fn invitations(&self) -> Vec<Invitation> {
        self.invitations.read().await.clone()
    }
}

#[async_trait]
impl BoardGateway for InMemoryGateway {
    async fn get_board_by_id(&self, id: &str) -> Result<Board, GatewayError> {
        self.boards
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.to_owned()))
    }

    async fn save_board(&self, board: &Board) -> Result<SaveReceipt, GatewayError> {
        let mut boards = self.boards.write().await;
        if !boards.contains_key(&board.id) {
            return Err(GatewayError::NotFound(board.id.clone()));
        }

        let mut stored = board.clone();
        let mut issued = Vec::new();
        for id in stored
            .products
            .iter_mut()
            .map(|product| &mut product.id)
            .chain(stored.text_elements.iter_mut().map(|text| &mut text.id))
        {
            if let EntityId::Local(local) = id {
                // Every occurrence gets its own id, even when local ids collide.
                let persisted = Uuid::new_v4().to_string();
                issued.push(IssuedId::new(local.clone(), persisted.clone()));
                *id = EntityId::Persisted(persisted);
            }
        }

        info!(board_id = %stored.id, issued = issued.len(), "memory gateway: board saved");
        boards.insert(stored.id.clone(), stored);
        Ok(SaveReceipt { issued })
    }

    async fn invite_collaborator(&self, board_id: &str, email: &str, role: CollaboratorRole) -> Result<(), GatewayError> {
        if !is_plausible_email(email) {
            return Err(GatewayError::Validation(format!("malformed email: {email}")));
        }
        if !self.boards.read().await.contains_key(board_id) {
            return Err(GatewayError::NotFound(board_id.to_owned()));
        }
        self.invitations
            .write()
            .await
            .push(Invitation { board_id: board_id.to_owned(), email: email.trim().to_owned(), role });
        Ok(())
    }
}
