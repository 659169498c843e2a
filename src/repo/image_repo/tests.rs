use super::*;
use crate::models::NewClothingItem;
use crate::repo::create_clothing_item;
use crate::test_utils::setup_test_db;

fn new_item(pool: &DbPool) -> String {
    let new = NewClothingItem {
        name: "Linen shirt".to_string(),
        ..Default::default()
    };
    create_clothing_item(pool, new, &[]).unwrap().item.get_id()
}

#[test]
fn test_add_and_list_images() {
    let pool = setup_test_db();
    let item_id = new_item(&pool);

    let first = add_image(&pool, &item_id, "/uploads/a.png", None, false).unwrap();
    let second = add_image(&pool, &item_id, "/uploads/b.png", Some("back".to_string()), true).unwrap();

    let images = list_images_for_item(&pool, &item_id).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].get_id(), second.get_id());
    assert_eq!(images[0].get_alt(), Some("back".to_string()));
    assert_eq!(images[1].get_id(), first.get_id());
}

#[test]
fn test_new_primary_image_replaces_old_one() {
    let pool = setup_test_db();
    let item_id = new_item(&pool);

    add_image(&pool, &item_id, "/uploads/a.png", None, true).unwrap();
    let replacement = add_image(&pool, &item_id, "/uploads/b.png", None, true).unwrap();

    let images = list_images_for_item(&pool, &item_id).unwrap();
    let primaries: Vec<_> = images.iter().filter(|i| i.is_primary()).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].get_id(), replacement.get_id());
}

#[test]
fn test_add_image_to_missing_item_fails() {
    let pool = setup_test_db();
    assert!(add_image(&pool, "missing", "/uploads/a.png", None, false).is_err());
}

#[test]
fn test_list_images_for_item_without_images() {
    let pool = setup_test_db();
    let item_id = new_item(&pool);
    assert!(list_images_for_item(&pool, &item_id).unwrap().is_empty());
}
