//! RaiBoard — local-first editing core for the marketplace moodboard canvas.
//!
//! DESIGN
//! ======
//! `store` holds the board and its sync state as pure transitions. `local`
//! mints new elements, `facade` maps gestures onto the store, `guard`
//! protects unsaved edits on the way out, and `session` owns all of it for
//! one board view. `gateway` is the async persistence boundary.

pub mod config;
pub mod facade;
pub mod gateway;
pub mod guard;
pub mod local;
pub mod notify;
pub mod session;
pub mod store;
pub mod types;

pub use config::RaiboardConfig;
pub use facade::InteractionFacade;
pub use gateway::{BoardGateway, GatewayError, HttpGateway, InMemoryGateway, SaveReceipt};
pub use guard::{NavigationGuard, NavigationOutcome, Navigator, UnloadPrompt};
pub use notify::{Notifier, Toast, ToastVariant};
pub use session::EditingSession;
pub use store::{BoardAction, BoardStore, BoardStoreState, SyncStatus, reduce};
pub use types::{Board, BoardProduct, EntityId, IssuedId, Position, Product, Size, TextElement, TextElementPatch, TextKind};
