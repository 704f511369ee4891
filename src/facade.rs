//! Interaction facade — turns canvas gestures into store transitions.
//!
//! SYSTEM CONTEXT
//! ==============
//! The UI never dispatches into the store directly. Discrete actions (add,
//! remove, invite) report their outcome as a toast; continuous ones (move,
//! resize, typing) do not, since they fire on every pointer frame. After each
//! mutation the guard's page-close prompt is re-synced with the dirty flag.
//!
//! ERROR HANDLING
//! ==============
//! Local mutations cannot fail. Inviting a collaborator is the one call that
//! can; its failure is toasted as destructive and also returned.

#[cfg(test)]
#[path = "facade_test.rs"]
mod facade_test;

use tracing::{info, warn};

use crate::gateway::{BoardGateway, GatewayError};
use crate::guard::NavigationGuard;
use crate::local;
use crate::notify::{Notifier, Toast};
use crate::store::BoardStore;
use crate::types::{CollaboratorRole, EntityId, Position, Product, Size, TextElementPatch, TextKind};

/// Borrowed view over an editing session's parts. Cheap to build per event.
pub struct InteractionFacade<'a> {
    store: &'a mut BoardStore,
    guard: &'a mut NavigationGuard,
    notifier: &'a dyn Notifier,
    gateway: &'a dyn BoardGateway,
}

impl<'a> InteractionFacade<'a> {
    pub fn new(
        store: &'a mut BoardStore,
        guard: &'a mut NavigationGuard,
        notifier: &'a dyn Notifier,
        gateway: &'a dyn BoardGateway,
    ) -> Self {
        Self { store, guard, notifier, gateway }
    }

    // =========================================================================
    // ADD / REMOVE
    // =========================================================================

    pub fn add_text(&mut self, kind: TextKind, position: Position) -> Option<EntityId> {
        let id = local::add_text_element_locally(self.store, kind, position)?;
        self.notifier.notify(Toast::success("Text added", None));
        self.sync_guard();
        Some(id)
    }

    pub fn add_product(&mut self, product: &Product, position: Position) -> Option<EntityId> {
        let id = local::add_product_locally(self.store, product, position)?;
        self.notifier.notify(Toast::success("Product added", Some(product.name.clone())));
        self.sync_guard();
        Some(id)
    }

    pub fn remove_product(&mut self, id: &EntityId) {
        if self.store.board().is_none() {
            return;
        }
        self.store.remove_product(id);
        self.notifier.notify(Toast::success("Element removed", None));
        self.sync_guard();
    }

    pub fn remove_text(&mut self, id: &EntityId) {
        if self.store.board().is_none() {
            return;
        }
        self.store.remove_text_element(id);
        self.notifier.notify(Toast::success("Element removed", None));
        self.sync_guard();
    }

    // =========================================================================
    // CONTINUOUS GESTURES (no toasts)
    // =========================================================================

    pub fn move_product(&mut self, id: &EntityId, position: Position, z_index: Option<i32>) {
        self.store.update_product_position(id, position, z_index);
        self.sync_guard();
    }

    pub fn resize_product(&mut self, id: &EntityId, size: Size) {
        self.store.update_product_size(id, size);
        self.sync_guard();
    }

    pub fn move_text(&mut self, id: &EntityId, position: Position, z_index: Option<i32>) {
        self.store.update_text_element_position(id, position, z_index);
        self.sync_guard();
    }

    pub fn resize_text(&mut self, id: &EntityId, size: Size) {
        self.store.update_text_element_size(id, size);
        self.sync_guard();
    }

    pub fn edit_text(&mut self, id: &EntityId, patch: TextElementPatch) {
        self.store.update_text_element(id, patch);
        self.sync_guard();
    }

    // =========================================================================
    // Z-ORDER
    // =========================================================================

    /// Raise a product above every other element. Unknown ids are ignored.
    pub fn bring_product_to_front(&mut self, id: &EntityId) {
        let Some(board) = self.store.board() else {
            return;
        };
        let Some(position) = board.product(id).map(|product| product.position) else {
            return;
        };
        let top = board.max_z_index().saturating_add(1);
        self.move_product(id, position, Some(top));
    }

    /// Raise a text element above every other element. Unknown ids are ignored.
    pub fn bring_text_to_front(&mut self, id: &EntityId) {
        let Some(board) = self.store.board() else {
            return;
        };
        let Some(position) = board.text_element(id).map(|text| text.position) else {
            return;
        };
        let top = board.max_z_index().saturating_add(1);
        self.move_text(id, position, Some(top));
    }

    // =========================================================================
    // COLLABORATION
    // =========================================================================

    /// Invite `email` to the active board.
    ///
    /// # Errors
    ///
    /// Returns the gateway error (already toasted), or a validation error
    /// when no board is open.
    pub async fn invite_collaborator(&self, email: &str, role: CollaboratorRole) -> Result<(), GatewayError> {
        let Some(board_id) = self.store.board().map(|board| board.id.clone()) else {
            let err = GatewayError::Validation("no board is open".to_owned());
            self.notifier.notify(Toast::error("Failed to send invitation", err.to_string()));
            return Err(err);
        };

        match self.gateway.invite_collaborator(&board_id, email, role).await {
            Ok(()) => {
                info!(%board_id, %role, "collaborator invited");
                self.notifier.notify(Toast::success("Invitation sent", Some(email.to_owned())));
                Ok(())
            }
            Err(e) => {
                warn!(%board_id, error = %e, code = e.error_code(), "invite failed");
                self.notifier.notify(Toast::error("Failed to send invitation", e.to_string()));
                Err(e)
            }
        }
    }

    fn sync_guard(&mut self) {
        self.guard.observe_dirty(self.store.has_unsaved_changes());
    }
}
