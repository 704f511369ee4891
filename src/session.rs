//! Editing session — owns the board store for one board view.
//!
//! DESIGN
//! ======
//! The session is the only owner of the [`BoardStore`]. The facade and the
//! navigation guard get borrowed access per call, never a global handle.
//! The two async boundaries (load, save) live here; both are one request
//! per user action with no cancellation. A save is refused while another is
//! in flight because the store's `SyncStatus` says so.
//!
//! ERROR HANDLING
//! ==============
//! Gateway failures are toasted, logged, and returned. A failed load sends
//! the user back to the board list; a failed save keeps the edits and the
//! dirty flag so the user can retry.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_BOARD_LIST_PATH;
use crate::facade::InteractionFacade;
use crate::gateway::{BoardGateway, GatewayError};
use crate::guard::{NavigationGuard, NavigationOutcome};
use crate::notify::{Notifier, Toast};
use crate::store::BoardStore;

pub struct EditingSession {
    store: BoardStore,
    guard: NavigationGuard,
    gateway: Arc<dyn BoardGateway>,
    notifier: Arc<dyn Notifier>,
    board_list_path: String,
}

impl EditingSession {
    #[must_use]
    pub fn new(gateway: Arc<dyn BoardGateway>, notifier: Arc<dyn Notifier>, guard: NavigationGuard) -> Self {
        Self {
            store: BoardStore::new(),
            guard,
            gateway,
            notifier,
            board_list_path: DEFAULT_BOARD_LIST_PATH.to_owned(),
        }
    }

    /// Where a failed load redirects to.
    #[must_use]
    pub fn with_board_list_path(mut self, path: impl Into<String>) -> Self {
        self.board_list_path = path.into();
        self
    }

    #[must_use]
    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    #[must_use]
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn facade(&mut self) -> InteractionFacade<'_> {
        InteractionFacade::new(&mut self.store, &mut self.guard, self.notifier.as_ref(), self.gateway.as_ref())
    }

    // =========================================================================
    // LOAD / SAVE
    // =========================================================================

    /// Load `board_id`, replacing whatever board was active.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after toasting it and redirecting to the
    /// board list.
    pub async fn open(&mut self, board_id: &str) -> Result<(), GatewayError> {
        self.store.set_loading(true);
        match self.gateway.get_board_by_id(board_id).await {
            Ok(board) => {
                info!(%board_id, products = board.products.len(), texts = board.text_elements.len(), "board loaded");
                self.store.set_board(board);
                self.guard.observe_dirty(false);
                Ok(())
            }
            Err(e) => {
                error!(%board_id, error = %e, code = e.error_code(), "board load failed");
                self.store.set_loading(false);
                self.notifier.notify(Toast::error("Error loading board", e.to_string()));
                self.guard.observe_dirty(self.store.has_unsaved_changes());
                let path = self.board_list_path.clone();
                self.guard.navigate_with_confirmation(&path, false);
                Err(e)
            }
        }
    }

    /// Save the active board.
    ///
    /// Returns `Ok(false)` without calling the gateway when no board is
    /// loaded or a save is already in flight.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after toasting it; edits stay dirty.
    pub async fn save(&mut self) -> Result<bool, GatewayError> {
        let result = save_board(&mut self.store, self.gateway.as_ref(), self.notifier.as_ref()).await;
        self.guard.observe_dirty(self.store.has_unsaved_changes());
        result
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    pub fn request_navigation(&mut self, path: &str) -> NavigationOutcome {
        let dirty = self.store.has_unsaved_changes();
        self.guard.navigate_with_confirmation(path, dirty)
    }

    /// Save, then leave for the parked path even if the save failed.
    pub async fn save_and_navigate(&mut self) -> Option<String> {
        let store = &mut self.store;
        let gateway = self.gateway.as_ref();
        let notifier = self.notifier.as_ref();
        let navigated = self
            .guard
            .handle_save_and_navigate(async move {
                if let Err(e) = save_board(store, gateway, notifier).await {
                    debug!(error = %e, "leaving board after failed save");
                }
            })
            .await;
        self.guard.observe_dirty(self.store.has_unsaved_changes());
        navigated
    }

    pub fn discard_and_navigate(&mut self) -> Option<String> {
        self.guard.handle_discard_and_navigate()
    }

    pub fn cancel_navigation(&mut self) {
        self.guard.handle_cancel_navigation();
    }
}

async fn save_board(store: &mut BoardStore, gateway: &dyn BoardGateway, notifier: &dyn Notifier) -> Result<bool, GatewayError> {
    if !store.begin_save() {
        debug!("save skipped: no board loaded or save already in flight");
        return Ok(false);
    }
    // begin_save only succeeds with a board loaded.
    let Some(board) = store.state().board.clone() else {
        return Ok(false);
    };

    match gateway.save_board(&board).await {
        Ok(receipt) => {
            info!(board_id = %board.id, issued = receipt.issued.len(), "board saved");
            store.save_succeeded(&board.id, receipt.issued);
            notifier.notify(Toast::success("Board saved", None));
            Ok(true)
        }
        Err(e) => {
            warn!(board_id = %board.id, error = %e, code = e.error_code(), "board save failed");
            store.save_failed(&board.id);
            notifier.notify(Toast::error("Error saving board", e.to_string()));
            Err(e)
        }
    }
}
