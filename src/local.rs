//! Local element creation — builds board entities with provisional ids and
//! default geometry, then hands them to the store.
//!
//! Ids are `local-product-<unixMillis>` / `local-text-<unixMillis>`. When the
//! stamp is already taken on the board, the next free millisecond is used, so
//! ids minted here never collide. Boards built elsewhere may still carry
//! duplicates; the save path issues one durable id per entity regardless.

#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::BoardStore;
use crate::types::{BoardProduct, EntityId, FontWeight, Position, Product, Size, TextElement, TextKind};

pub const DEFAULT_PRODUCT_SIZE: Size = Size { width: 200.0, height: 200.0 };
pub const DEFAULT_HEADING_SIZE: Size = Size { width: 200.0, height: 50.0 };
pub const DEFAULT_PARAGRAPH_SIZE: Size = Size { width: 200.0, height: 100.0 };
pub const DEFAULT_Z_INDEX: i32 = 1;
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(i64::MAX)
}

#[must_use]
pub fn local_product_id(now_ms: i64) -> EntityId {
    EntityId::Local(format!("local-product-{now_ms}"))
}

#[must_use]
pub fn local_text_id(now_ms: i64) -> EntityId {
    EntityId::Local(format!("local-text-{now_ms}"))
}

/// First stamp at or after `now_ms` whose minted id is not `taken`.
fn free_stamp(now_ms: i64, mint: fn(i64) -> EntityId, taken: impl Fn(&EntityId) -> bool) -> i64 {
    let mut stamp = now_ms;
    while taken(&mint(stamp)) {
        stamp = stamp.saturating_add(1);
    }
    stamp
}

/// Snapshot `product` into a board entity at `position`.
#[must_use]
pub fn new_board_product(product: &Product, position: Position, now_ms: i64) -> BoardProduct {
    BoardProduct {
        id: local_product_id(now_ms),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        product_image: product.display_image().to_owned(),
        product_price: product.price,
        position,
        size: DEFAULT_PRODUCT_SIZE,
        z_index: DEFAULT_Z_INDEX,
        rotation: 0.0,
    }
}

/// Empty text element styled for `kind`.
#[must_use]
pub fn new_text_element(kind: TextKind, position: Position, now_ms: i64) -> TextElement {
    let (size, font_size, font_weight) = match kind {
        TextKind::Heading => (DEFAULT_HEADING_SIZE, 24, FontWeight::Bold),
        TextKind::Paragraph => (DEFAULT_PARAGRAPH_SIZE, 16, FontWeight::Normal),
    };
    TextElement {
        id: local_text_id(now_ms),
        kind,
        content: String::new(),
        position,
        size,
        z_index: DEFAULT_Z_INDEX,
        font_size,
        font_weight,
        color: DEFAULT_TEXT_COLOR.to_owned(),
    }
}

/// Place `product` on the active board. Returns the new id, or `None` when
/// no board is loaded.
pub fn add_product_locally(store: &mut BoardStore, product: &Product, position: Position) -> Option<EntityId> {
    let board = store.board()?;
    let stamp = free_stamp(now_ms(), local_product_id, |id| board.product(id).is_some());
    let entity = new_board_product(product, position, stamp);
    let id = entity.id.clone();
    store.add_product(entity);
    Some(id)
}

/// Place an empty text element on the active board. Returns the new id, or
/// `None` when no board is loaded.
pub fn add_text_element_locally(store: &mut BoardStore, kind: TextKind, position: Position) -> Option<EntityId> {
    let board = store.board()?;
    let stamp = free_stamp(now_ms(), local_text_id, |id| board.text_element(id).is_some());
    let entity = new_text_element(kind, position, stamp);
    let id = entity.id.clone();
    store.add_text_element(entity);
    Some(id)
}
