use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::gateway::{InMemoryGateway, SaveReceipt};
use crate::guard::test_helpers::{PlatformLog, recording_guard};
use crate::notify::test_helpers::RecordingNotifier;
use crate::store::SyncStatus;
use crate::local::new_board_product;
use crate::types::test_helpers::{catalog_product, seeded_board};
use crate::types::{Board, CollaboratorRole, EntityId, Position, TextKind};

// =============================================================================
// FailingGateway
// =============================================================================

/// Serves `b1` but rejects every save.
struct FailingGateway {
    saves: AtomicUsize,
}

#[async_trait::async_trait]
impl BoardGateway for FailingGateway {
    async fn get_board_by_id(&self, id: &str) -> Result<Board, GatewayError> {
        if id == "b1" { Ok(seeded_board()) } else { Err(GatewayError::NotFound(id.to_owned())) }
    }

    async fn save_board(&self, _board: &Board) -> Result<SaveReceipt, GatewayError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(GatewayError::Transport("connection reset".to_owned()))
    }

    async fn invite_collaborator(&self, _board_id: &str, _email: &str, _role: CollaboratorRole) -> Result<(), GatewayError> {
        Err(GatewayError::Transport("connection reset".to_owned()))
    }
}

struct Harness {
    session: EditingSession,
    notifier: Arc<RecordingNotifier>,
    platform: PlatformLog,
}

fn harness(gateway: Arc<dyn BoardGateway>) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let (guard, platform) = recording_guard();
    let session = EditingSession::new(gateway, notifier.clone(), guard).with_board_list_path("/boards");
    Harness { session, notifier, platform }
}

fn memory_harness() -> (Harness, Arc<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::with_boards([seeded_board()]));
    (harness(gateway.clone()), gateway)
}

fn failing_harness() -> (Harness, Arc<FailingGateway>) {
    let gateway = Arc::new(FailingGateway { saves: AtomicUsize::new(0) });
    (harness(gateway.clone()), gateway)
}

// =============================================================================
// open
// =============================================================================

#[tokio::test]
async fn open_loads_clean_board() {
    let (mut h, _gateway) = memory_harness();
    h.session.open("b1").await.unwrap();

    let state = h.session.store().state();
    assert!(!state.loading);
    assert_eq!(state.sync, SyncStatus::Clean);
    assert_eq!(h.session.store().board().unwrap().id, "b1");
    assert!(h.platform.events().is_empty());
}

#[tokio::test]
async fn open_failure_toasts_and_redirects_to_board_list() {
    let (mut h, _gateway) = memory_harness();
    let err = h.session.open("missing").await.unwrap_err();

    assert!(matches!(err, GatewayError::NotFound(_)));
    assert!(!h.session.store().state().loading);
    assert!(h.session.store().board().is_none());
    let toast = h.notifier.last().unwrap();
    assert_eq!(toast.title, "Error loading board");
    assert!(toast.is_destructive());
    assert_eq!(h.platform.navigations(), vec!["/boards"]);
}

// =============================================================================
// save
// =============================================================================

#[tokio::test]
async fn end_to_end_move_then_save() {
    let (mut h, gateway) = memory_harness();
    h.session.open("b1").await.unwrap();

    h.session
        .facade()
        .move_product(&EntityId::parse("p1"), Position { x: 10.0, y: 20.0 }, None);

    let board = h.session.store().board().unwrap();
    let moved = board.product(&EntityId::parse("p1")).unwrap();
    assert_eq!(moved.position, Position { x: 10.0, y: 20.0 });
    assert_eq!(moved.z_index, 1);
    assert!(h.session.store().has_unsaved_changes());
    assert!(h.session.guard().unload_armed());

    assert!(h.session.save().await.unwrap());
    assert!(!h.session.store().has_unsaved_changes());
    assert!(!h.session.guard().unload_armed());
    assert_eq!(h.notifier.last().unwrap().title, "Board saved");

    let stored = gateway.board("b1").await.unwrap();
    assert_eq!(stored.product(&EntityId::parse("p1")).unwrap().position, Position { x: 10.0, y: 20.0 });
    assert_eq!(h.platform.events(), vec!["unload:arm", "unload:disarm"]);
}

#[tokio::test]
async fn save_reconciles_local_ids() {
    let (mut h, gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    let local = h.session.facade().add_text(TextKind::Heading, Position { x: 5.0, y: 5.0 }).unwrap();
    assert!(local.is_local());

    h.session.save().await.unwrap();

    let board = h.session.store().board().unwrap();
    assert_eq!(board.local_entity_count(), 0);
    let persisted = &board.text_elements.last().unwrap().id;
    assert!(!persisted.is_local());
    assert_eq!(gateway.board("b1").await.unwrap().text_elements.last().unwrap().id, *persisted);
}

#[tokio::test]
async fn save_gives_same_millisecond_products_distinct_ids() {
    let (mut h, gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    let product = catalog_product();
    h.session.store.add_product(new_board_product(&product, Position::default(), 7));
    h.session.store.add_product(new_board_product(&product, Position { x: 50.0, y: 0.0 }, 7));

    assert!(h.session.save().await.unwrap());

    let ids: Vec<EntityId> = h.session.store().board().unwrap().products.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), 4);
    assert!(!ids[2].is_local());
    assert_ne!(ids[2], ids[3]);
    let stored: Vec<EntityId> = gateway.board("b1").await.unwrap().products.into_iter().map(|p| p.id).collect();
    assert_eq!(stored, ids);

    h.session.facade().remove_product(&ids[2]);
    let remaining = &h.session.store().board().unwrap().products;
    assert_eq!(remaining.len(), 3);
    assert_eq!(remaining[2].id, ids[3]);
}

#[tokio::test]
async fn save_without_board_does_not_call_gateway() {
    let (mut h, gateway) = failing_harness();
    assert!(!h.session.save().await.unwrap());
    assert_eq!(gateway.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_save_keeps_edits_dirty() {
    let (mut h, gateway) = failing_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_product(&EntityId::parse("p2"));

    let err = h.session.save().await.unwrap_err();
    assert!(err.retryable());
    assert_eq!(gateway.saves.load(Ordering::SeqCst), 1);
    assert_eq!(h.session.store().state().sync, SyncStatus::Dirty);
    assert_eq!(h.session.store().board().unwrap().products.len(), 1);
    assert!(h.session.guard().unload_armed());

    let toast = h.notifier.last().unwrap();
    assert_eq!(toast.title, "Error saving board");
    assert!(toast.is_destructive());
}

// =============================================================================
// navigation
// =============================================================================

#[tokio::test]
async fn clean_navigation_leaves_immediately() {
    let (mut h, _gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    assert_eq!(h.session.request_navigation("/x"), NavigationOutcome::Navigated("/x".to_owned()));
    assert_eq!(h.platform.navigations(), vec!["/x"]);
}

#[tokio::test]
async fn dirty_navigation_then_save_and_navigate() {
    let (mut h, gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_text(&EntityId::parse("t1"));

    let outcome = h.session.request_navigation("/cart");
    assert_eq!(outcome, NavigationOutcome::AwaitingConfirmation("/cart".to_owned()));
    assert!(h.platform.navigations().is_empty());

    assert_eq!(h.session.save_and_navigate().await.as_deref(), Some("/cart"));
    assert_eq!(h.platform.navigations(), vec!["/cart"]);
    assert!(!h.session.store().has_unsaved_changes());
    assert!(gateway.board("b1").await.unwrap().text_elements.is_empty());
}

#[tokio::test]
async fn save_and_navigate_leaves_even_when_save_fails() {
    let (mut h, gateway) = failing_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_text(&EntityId::parse("t1"));
    h.session.request_navigation("/cart");

    assert_eq!(h.session.save_and_navigate().await.as_deref(), Some("/cart"));
    assert_eq!(gateway.saves.load(Ordering::SeqCst), 1);
    assert_eq!(h.platform.navigations(), vec!["/cart"]);
    assert!(h.session.store().has_unsaved_changes());
}

#[tokio::test]
async fn discard_and_navigate_never_saves() {
    let (mut h, gateway) = failing_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_text(&EntityId::parse("t1"));
    h.session.request_navigation("/home");

    assert_eq!(h.session.discard_and_navigate().as_deref(), Some("/home"));
    assert_eq!(gateway.saves.load(Ordering::SeqCst), 0);
    assert!(h.session.guard().pending_path().is_none());
}

#[tokio::test]
async fn cancel_navigation_keeps_dirty_state() {
    let (mut h, _gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_text(&EntityId::parse("t1"));
    h.session.request_navigation("/home");

    h.session.cancel_navigation();
    assert!(!h.session.guard().is_confirming());
    assert!(h.session.store().has_unsaved_changes());
    assert!(h.platform.navigations().is_empty());
}

#[tokio::test]
async fn reopening_resets_dirty_state_and_unload_prompt() {
    let (mut h, _gateway) = memory_harness();
    h.session.open("b1").await.unwrap();
    h.session.facade().remove_text(&EntityId::parse("t1"));
    assert!(h.session.guard().unload_armed());

    h.session.open("b1").await.unwrap();
    assert!(!h.session.store().has_unsaved_changes());
    assert!(!h.session.guard().unload_armed());
    assert_eq!(h.session.store().board().unwrap().text_elements.len(), 1);
}
