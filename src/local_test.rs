use super::*;
use crate::types::test_helpers::{catalog_product, seeded_board};

#[test]
fn new_text_element_heading_defaults() {
    let text = new_text_element(TextKind::Heading, Position { x: 5.0, y: 5.0 }, 1_700_000_000_000);
    assert_eq!(text.id, EntityId::Local("local-text-1700000000000".to_owned()));
    assert_eq!(text.size, Size { width: 200.0, height: 50.0 });
    assert_eq!(text.font_weight, FontWeight::Bold);
    assert_eq!(text.font_size, 24);
    assert_eq!(text.content, "");
    assert_eq!(text.color, "#000000");
    assert_eq!(text.position, Position { x: 5.0, y: 5.0 });
}

#[test]
fn new_text_element_paragraph_defaults() {
    let text = new_text_element(TextKind::Paragraph, Position::default(), 7);
    assert_eq!(text.size, Size { width: 200.0, height: 100.0 });
    assert_eq!(text.font_weight, FontWeight::Normal);
    assert_eq!(text.font_size, 16);
    assert_eq!(text.z_index, 1);
}

#[test]
fn new_board_product_snapshots_catalog_fields() {
    let product = catalog_product();
    let entity = new_board_product(&product, Position { x: 40.0, y: 60.0 }, 123);

    assert_eq!(entity.id, EntityId::Local("local-product-123".to_owned()));
    assert_eq!(entity.product_id, "sku-42");
    assert_eq!(entity.product_name, "Linen sofa");
    assert_eq!(entity.product_image, "/img/sofa-1.png");
    assert!((entity.product_price - 899.5).abs() < f64::EPSILON);
    assert_eq!(entity.size, DEFAULT_PRODUCT_SIZE);
    assert_eq!(entity.z_index, 1);
    assert!(entity.rotation.abs() < f64::EPSILON);
}

#[test]
fn same_millisecond_builders_collide() {
    let a = new_text_element(TextKind::Heading, Position::default(), 42);
    let b = new_text_element(TextKind::Paragraph, Position::default(), 42);
    assert_eq!(a.id, b.id);
}

#[test]
fn free_stamp_skips_taken_ids() {
    let taken = [local_product_id(7), local_product_id(8)];
    assert_eq!(free_stamp(7, local_product_id, |id| taken.contains(id)), 9);
    assert_eq!(free_stamp(7, local_text_id, |id| taken.contains(id)), 7);
}

#[test]
fn back_to_back_adds_get_distinct_ids() {
    let mut store = BoardStore::new();
    store.set_board(seeded_board());

    let ids: Vec<EntityId> = (0..5)
        .filter_map(|_| add_product_locally(&mut store, &catalog_product(), Position::default()))
        .collect();
    let texts: Vec<EntityId> = (0..5)
        .filter_map(|_| add_text_element_locally(&mut store, TextKind::Heading, Position::default()))
        .collect();

    for batch in [&ids, &texts] {
        for (i, a) in batch.iter().enumerate() {
            assert!(batch[i + 1..].iter().all(|b| b != a), "duplicate id {a}");
        }
    }
}

#[test]
fn add_locally_requires_loaded_board() {
    let mut store = BoardStore::new();
    assert!(add_text_element_locally(&mut store, TextKind::Heading, Position::default()).is_none());
    assert!(add_product_locally(&mut store, &catalog_product(), Position::default()).is_none());
    assert!(!store.has_unsaved_changes());
}

#[test]
fn add_locally_dispatches_into_store() {
    let mut store = BoardStore::new();
    store.set_board(seeded_board());

    let product_id = add_product_locally(&mut store, &catalog_product(), Position { x: 1.0, y: 2.0 }).unwrap();
    let text_id = add_text_element_locally(&mut store, TextKind::Paragraph, Position { x: 3.0, y: 4.0 }).unwrap();

    let board = store.board().unwrap();
    assert!(product_id.as_str().starts_with("local-product-"));
    assert!(text_id.as_str().starts_with("local-text-"));
    assert_eq!(board.products.last().unwrap().id, product_id);
    assert_eq!(board.text_elements.last().unwrap().id, text_id);
    assert!(store.has_unsaved_changes());
}
