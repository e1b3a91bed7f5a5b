mod common;

use common::{account_service, args, json};
use librum::application::AppError;

#[test]
fn test_invoke_routes_the_full_surface() {
    let mut service = account_service();

    assert!(service.invoke("Init", &args(&[])).unwrap().is_empty());
    assert!(
        service
            .invoke("Create", &args(&["7", "500", "Ana"]))
            .unwrap()
            .is_empty()
    );

    let record = json(&service.invoke("Read", &args(&["7"])).unwrap());
    assert_eq!(record["accountNumber"], 7);

    let rows = json(&service.invoke("GetAll", &args(&[])).unwrap());
    assert_eq!(rows.as_array().unwrap().len(), 6);

    let matches = json(&service.invoke("QueryByOwner", &args(&["Ana"])).unwrap());
    assert_eq!(matches.as_array().unwrap().len(), 1);

    assert!(
        service
            .invoke(
                "Update",
                &args(&[
                    r#"{"docType":"Account","accountNumber":7,"accountBalance":900,"accountOwner":"Ana"}"#
                ])
            )
            .unwrap()
            .is_empty()
    );

    let trail = json(&service.invoke("GetHistory", &args(&["7"])).unwrap());
    assert_eq!(trail.as_array().unwrap().len(), 2);

    assert!(
        service
            .invoke("Transfer", &args(&["1", "2", "100"]))
            .unwrap()
            .is_empty()
    );
    assert!(service.invoke("Delete", &args(&["7"])).unwrap().is_empty());
}

#[test]
fn test_invoke_read_returns_stored_bytes() {
    let mut service = account_service();
    service.create("3", "500", "Ana").unwrap();

    let via_invoke = service.invoke("Read", &args(&["3"])).unwrap();
    let direct = service.read("3").unwrap();
    assert_eq!(via_invoke, direct);
}

#[test]
fn test_invoke_checks_arity() {
    let mut service = account_service();

    for (function, wrong) in [
        ("Init", vec!["extra"]),
        ("Create", vec!["1", "2"]),
        ("Read", vec![]),
        ("GetAll", vec!["extra"]),
        ("QueryByOwner", vec![]),
        ("Update", vec!["a", "b"]),
        ("Delete", vec![]),
        ("GetHistory", vec!["1", "2"]),
        ("Transfer", vec!["1", "2"]),
    ] {
        let err = service.invoke(function, &args(&wrong)).unwrap_err();
        assert!(
            matches!(err, AppError::InvalidArgument(_)),
            "{function} with {} args should be rejected",
            wrong.len()
        );
    }
}

#[test]
fn test_invoke_rejects_unknown_functions() {
    let mut service = account_service();
    assert!(matches!(
        service.invoke("Destroy", &args(&["1"])),
        Err(AppError::InvalidArgument(_))
    ));
}

#[test]
fn test_errors_format_as_flat_strings() {
    let mut service = account_service();
    service.create("1", "100", "Ana").unwrap();

    let err = service.invoke("Create", &args(&["1", "100", "Ana"])).unwrap_err();
    assert_eq!(err.to_string(), "Account 1 already exists");

    let err = service.invoke("Read", &args(&["9"])).unwrap_err();
    assert_eq!(err.to_string(), "Account 9 does not exist");
}
