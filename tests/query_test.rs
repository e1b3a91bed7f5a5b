mod common;

use common::{
    account_service, account_service_on, card_service, event_names, json,
    unscoped_account_service,
};
use librum::application::AppError;
use librum::storage::MemoryStore;

#[test]
fn test_query_by_owner_returns_exact_live_set() {
    let mut service = account_service();
    service.create("1", "100", "Ana").unwrap();
    service.create("2", "200", "Ana").unwrap();
    service.create("3", "300", "Bruno").unwrap();
    service.create("4", "400", "Ana").unwrap();
    service.delete("2").unwrap();

    let matches = json(&service.query_by_owner("Ana").unwrap());
    let ids: Vec<u64> = matches
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["accountNumber"].as_u64().unwrap())
        .collect();

    // Exactly the live Ana records; the deleted id 2 is gone
    assert_eq!(ids, vec![1, 4]);

    let none = json(&service.query_by_owner("Carla").unwrap());
    assert_eq!(none.as_array().unwrap().len(), 0);
}

#[test]
fn test_query_is_scoped_by_discriminator() {
    // Account and card records sharing one store
    let mut cards = card_service();
    cards.create("1", "500", "Ana").unwrap();
    let mut service = account_service_on(cards.into_store());
    service.create("1", "100", "Ana").unwrap();

    let matches = json(&service.query_by_owner("Ana").unwrap());
    let kinds: Vec<&str> = matches
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["docType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Account"]);
}

#[test]
fn test_query_fails_without_selector_support() {
    let mut service = account_service_on(MemoryStore::new().with_rejected_selectors());
    service.create("1", "100", "Ana").unwrap();

    assert!(matches!(
        service.query_by_owner("Ana"),
        Err(AppError::QueryFailed(_))
    ));
}

#[test]
fn test_query_argument_validation() {
    let mut service = account_service();
    assert!(matches!(
        service.query_by_owner(""),
        Err(AppError::InvalidArgument(_))
    ));
}

#[test]
fn test_get_all_preserves_store_iteration_order() {
    let mut service = account_service();
    service.create("2", "200", "Ana").unwrap();
    service.create("1", "100", "Bruno").unwrap();
    service.create("10", "1000", "Carla").unwrap();

    let rows = json(&service.get_all().unwrap());
    let ids: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["accountNumber"].as_u64().unwrap())
        .collect();

    // Lexicographic key order: ACC1, ACC10, ACC2
    assert_eq!(ids, vec![1, 10, 2]);
}

#[test]
fn test_get_all_scope_is_explicit() {
    // Shared store holding one account and one card
    let mut cards = card_service();
    cards.create("7", "700", "Ana").unwrap();
    let mut scoped = account_service_on(cards.into_store());
    scoped.create("1", "100", "Ana").unwrap();

    // Default scan is scoped to the account prefix
    let rows = json(&scoped.get_all().unwrap());
    let kinds: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["docType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Account"]);

    // The historical whole-store scan leaks the card record
    let mut unscoped = unscoped_account_service(scoped.into_store());
    let rows = json(&unscoped.get_all().unwrap());
    let kinds: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["docType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Account", "Card"]);
}

#[test]
fn test_get_all_iterator_failure_aborts_the_call() {
    let mut service = account_service();
    service.create("1", "100", "Ana").unwrap();

    let mut service = account_service_on(service.into_store().with_failing_iteration());
    let events_before = event_names(&service);

    assert!(matches!(service.get_all(), Err(AppError::Store(_))));
    assert_eq!(event_names(&service), events_before);
}

#[test]
fn test_get_all_on_empty_ledger() {
    let mut service = account_service();
    let rows = json(&service.get_all().unwrap());
    assert_eq!(rows, serde_json::json!([]));
}
