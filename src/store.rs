//! Board store — the single source of truth for the board being edited.
//!
//! DESIGN
//! ======
//! Transitions are pure: [`reduce`] takes the current state and one
//! [`BoardAction`] and returns the next state. The board sits behind an `Arc`
//! so a transition that changes nothing hands back the same allocation;
//! callers can detect a structural no-op with `Arc::ptr_eq`.
//!
//! Unsaved edits and the in-flight save share one [`SyncStatus`], so the
//! "saving" and "dirty" flags cannot drift apart. A save that completes or
//! fails for a board that is no longer active is ignored.
//!
//! ERROR HANDLING
//! ==============
//! None. Every transition is total: an unknown entity id or a missing board
//! yields the input state unchanged.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::types::{Board, BoardProduct, EntityId, IssuedId, Position, Size, TextElement, TextElementPatch};

// =============================================================================
// STATE
// =============================================================================

/// Persistence state of the active board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Matches the last load or successful save.
    #[default]
    Clean,
    /// Local edits not yet sent.
    Dirty,
    /// A save is in flight; `edited` records edits made since it started.
    Saving { edited: bool },
}

impl SyncStatus {
    #[must_use]
    pub fn has_unsaved_changes(self) -> bool {
        !matches!(self, Self::Clean)
    }

    #[must_use]
    pub fn is_saving(self) -> bool {
        matches!(self, Self::Saving { .. })
    }

    fn touched(self) -> Self {
        match self {
            Self::Saving { .. } => Self::Saving { edited: true },
            Self::Clean | Self::Dirty => Self::Dirty,
        }
    }
}

/// Snapshot of the store. Cloning is cheap: the board is shared.
#[derive(Clone, Debug, Default)]
pub struct BoardStoreState {
    pub board: Option<Arc<Board>>,
    pub loading: bool,
    pub sync: SyncStatus,
}

impl BoardStoreState {
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.sync.has_unsaved_changes()
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.sync.is_saving()
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Every way the store can change.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardAction {
    SetBoard(Board),
    SetLoading(bool),
    AddProduct(BoardProduct),
    UpdateProductPosition { id: EntityId, position: Position, z_index: Option<i32> },
    UpdateProductSize { id: EntityId, size: Size },
    RemoveProduct(EntityId),
    AddTextElement(TextElement),
    UpdateTextElementPosition { id: EntityId, position: Position, z_index: Option<i32> },
    UpdateTextElementSize { id: EntityId, size: Size },
    UpdateTextElement { id: EntityId, patch: TextElementPatch },
    RemoveTextElement(EntityId),
    MarkSaved,
    BeginSave,
    /// `issued` holds one server id per provisional entity, in board order.
    SaveSucceeded { board_id: String, issued: Vec<IssuedId> },
    SaveFailed { board_id: String },
}

// =============================================================================
// REDUCER
// =============================================================================

/// Apply one action to `state`.
#[must_use]
pub fn reduce(state: &BoardStoreState, action: BoardAction) -> BoardStoreState {
    match action {
        BoardAction::SetBoard(board) => {
            BoardStoreState { board: Some(Arc::new(board)), loading: false, sync: SyncStatus::Clean }
        }
        BoardAction::SetLoading(loading) => BoardStoreState { loading, ..state.clone() },
        BoardAction::AddProduct(product) => edit_board(state, |board| board.products.push(product)),
        BoardAction::UpdateProductPosition { id, position, z_index } => {
            let Some(slot) = product_slot(state, &id) else {
                return state.clone();
            };
            edit_board(state, |board| {
                let product = &mut board.products[slot];
                product.position = position;
                if let Some(z_index) = z_index {
                    product.z_index = z_index;
                }
            })
        }
        BoardAction::UpdateProductSize { id, size } => {
            let Some(slot) = product_slot(state, &id) else {
                return state.clone();
            };
            edit_board(state, |board| board.products[slot].size = size)
        }
        BoardAction::RemoveProduct(id) => {
            if product_slot(state, &id).is_none() {
                return touch(state);
            }
            edit_board(state, |board| board.products.retain(|product| product.id != id))
        }
        BoardAction::AddTextElement(text) => edit_board(state, |board| board.text_elements.push(text)),
        BoardAction::UpdateTextElementPosition { id, position, z_index } => {
            let Some(slot) = text_slot(state, &id) else {
                return state.clone();
            };
            edit_board(state, |board| {
                let text = &mut board.text_elements[slot];
                text.position = position;
                if let Some(z_index) = z_index {
                    text.z_index = z_index;
                }
            })
        }
        BoardAction::UpdateTextElementSize { id, size } => {
            let Some(slot) = text_slot(state, &id) else {
                return state.clone();
            };
            edit_board(state, |board| board.text_elements[slot].size = size)
        }
        BoardAction::UpdateTextElement { id, patch } => {
            let Some(slot) = text_slot(state, &id) else {
                return state.clone();
            };
            edit_board(state, |board| patch.apply_to(&mut board.text_elements[slot]))
        }
        BoardAction::RemoveTextElement(id) => {
            if text_slot(state, &id).is_none() {
                return touch(state);
            }
            edit_board(state, |board| board.text_elements.retain(|text| text.id != id))
        }
        BoardAction::MarkSaved => BoardStoreState { sync: SyncStatus::Clean, ..state.clone() },
        BoardAction::BeginSave => {
            if state.board.is_none() || state.sync.is_saving() {
                return state.clone();
            }
            BoardStoreState { sync: SyncStatus::Saving { edited: false }, ..state.clone() }
        }
        BoardAction::SaveSucceeded { board_id, issued } => save_succeeded(state, &board_id, &issued),
        BoardAction::SaveFailed { board_id } => {
            let active = state.board.as_ref().is_some_and(|board| board.id == board_id);
            if !active || !state.sync.is_saving() {
                return state.clone();
            }
            BoardStoreState { sync: SyncStatus::Dirty, ..state.clone() }
        }
    }
}

/// Copy-on-write edit of the active board; marks the state dirty.
fn edit_board(state: &BoardStoreState, edit: impl FnOnce(&mut Board)) -> BoardStoreState {
    let Some(current) = &state.board else {
        return state.clone();
    };
    let mut next = Board::clone(current);
    edit(&mut next);
    BoardStoreState { board: Some(Arc::new(next)), loading: state.loading, sync: state.sync.touched() }
}

/// Mark dirty without touching the board. Only removals do this.
fn touch(state: &BoardStoreState) -> BoardStoreState {
    if state.board.is_none() {
        return state.clone();
    }
    BoardStoreState { sync: state.sync.touched(), ..state.clone() }
}

fn product_slot(state: &BoardStoreState, id: &EntityId) -> Option<usize> {
    state.board.as_ref()?.products.iter().position(|product| &product.id == id)
}

fn text_slot(state: &BoardStoreState, id: &EntityId) -> Option<usize> {
    state.board.as_ref()?.text_elements.iter().position(|text| &text.id == id)
}

fn save_succeeded(state: &BoardStoreState, board_id: &str, issued: &[IssuedId]) -> BoardStoreState {
    let Some(current) = &state.board else {
        return state.clone();
    };
    if current.id != board_id {
        return state.clone();
    }

    // A board marked saved mid-flight keeps its status but still adopts the ids.
    let sync = match state.sync {
        SyncStatus::Saving { edited: false } => SyncStatus::Clean,
        SyncStatus::Saving { edited: true } => SyncStatus::Dirty,
        other => other,
    };
    let board = if needs_remap(current, issued) {
        let mut next = Board::clone(current);
        remap(&mut next, issued);
        Arc::new(next)
    } else {
        Arc::clone(current)
    };

    BoardStoreState { board: Some(board), loading: state.loading, sync }
}

fn needs_remap(board: &Board, issued: &[IssuedId]) -> bool {
    let mapped = |id: &EntityId| id.is_local() && issued.iter().any(|entry| entry.local_id == id.as_str());
    board.products.iter().any(|product| mapped(&product.id)) || board.text_elements.iter().any(|text| mapped(&text.id))
}

/// Hand out issued ids per occurrence: the n-th entity carrying a local id
/// takes the n-th id issued for it.
fn remap(board: &mut Board, issued: &[IssuedId]) {
    let mut queues: HashMap<&str, VecDeque<&str>> = HashMap::new();
    for entry in issued {
        queues.entry(entry.local_id.as_str()).or_default().push_back(entry.id.as_str());
    }

    let ids = board
        .products
        .iter_mut()
        .map(|product| &mut product.id)
        .chain(board.text_elements.iter_mut().map(|text| &mut text.id));
    for id in ids {
        if let EntityId::Local(local) = id
            && let Some(persisted) = queues.get_mut(local.as_str()).and_then(VecDeque::pop_front)
        {
            *id = EntityId::Persisted(persisted.to_owned());
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Owned store for one editing session. Mutation goes through [`reduce`]
/// only; the named methods are thin wrappers over [`BoardStore::dispatch`].
#[derive(Debug, Default)]
pub struct BoardStore {
    state: BoardStoreState,
}

impl BoardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &BoardStoreState {
        &self.state
    }

    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.state.board.as_deref()
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.has_unsaved_changes()
    }

    pub fn dispatch(&mut self, action: BoardAction) {
        self.state = reduce(&self.state, action);
    }

    pub fn set_board(&mut self, board: Board) {
        self.dispatch(BoardAction::SetBoard(board));
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.dispatch(BoardAction::SetLoading(loading));
    }

    pub fn add_product(&mut self, product: BoardProduct) {
        self.dispatch(BoardAction::AddProduct(product));
    }

    pub fn update_product_position(&mut self, id: &EntityId, position: Position, z_index: Option<i32>) {
        self.dispatch(BoardAction::UpdateProductPosition { id: id.clone(), position, z_index });
    }

    pub fn update_product_size(&mut self, id: &EntityId, size: Size) {
        self.dispatch(BoardAction::UpdateProductSize { id: id.clone(), size });
    }

    pub fn remove_product(&mut self, id: &EntityId) {
        self.dispatch(BoardAction::RemoveProduct(id.clone()));
    }

    pub fn add_text_element(&mut self, text: TextElement) {
        self.dispatch(BoardAction::AddTextElement(text));
    }

    pub fn update_text_element_position(&mut self, id: &EntityId, position: Position, z_index: Option<i32>) {
        self.dispatch(BoardAction::UpdateTextElementPosition { id: id.clone(), position, z_index });
    }

    pub fn update_text_element_size(&mut self, id: &EntityId, size: Size) {
        self.dispatch(BoardAction::UpdateTextElementSize { id: id.clone(), size });
    }

    pub fn update_text_element(&mut self, id: &EntityId, patch: TextElementPatch) {
        self.dispatch(BoardAction::UpdateTextElement { id: id.clone(), patch });
    }

    pub fn remove_text_element(&mut self, id: &EntityId) {
        self.dispatch(BoardAction::RemoveTextElement(id.clone()));
    }

    pub fn mark_saved(&mut self) {
        self.dispatch(BoardAction::MarkSaved);
    }

    /// Enter `Saving`. Returns `false` when no board is loaded or a save is
    /// already in flight.
    pub fn begin_save(&mut self) -> bool {
        let was_saving = self.state.is_saving();
        self.dispatch(BoardAction::BeginSave);
        !was_saving && self.state.is_saving()
    }

    pub fn save_succeeded(&mut self, board_id: &str, issued: Vec<IssuedId>) {
        self.dispatch(BoardAction::SaveSucceeded { board_id: board_id.to_owned(), issued });
    }

    pub fn save_failed(&mut self, board_id: &str) {
        self.dispatch(BoardAction::SaveFailed { board_id: board_id.to_owned() });
    }
}
