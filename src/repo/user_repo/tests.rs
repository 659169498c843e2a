use super::*;
use crate::test_utils::setup_test_db;

#[test]
fn test_create_and_get_user() {
    let pool = setup_test_db();

    let user = create_user(&pool, " ada@example.com ", Some("Ada".to_string())).unwrap();
    assert_eq!(user.get_email(), "ada@example.com");

    let fetched = get_user(&pool, &user.get_id()).unwrap().unwrap();
    assert_eq!(fetched.get_id(), user.get_id());
    assert_eq!(fetched.get_name(), Some("Ada".to_string()));
}

#[test]
fn test_get_missing_user() {
    let pool = setup_test_db();
    assert!(get_user(&pool, "nope").unwrap().is_none());
}

#[test]
fn test_duplicate_email_is_rejected() {
    let pool = setup_test_db();
    create_user(&pool, "dup@example.com", None).unwrap();
    assert!(create_user(&pool, "dup@example.com", None).is_err());
}
