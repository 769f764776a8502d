//! End-to-end flows through the controller over each storage backend.

use std::sync::Arc;

use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use crate::configuration::{Config, StorageBackend};
use crate::controller::Controller;
use crate::error_handling::types::{AuthError, ControllerError, RegistrationError};
use crate::storage::file_storage::FileStorage;
use crate::storage::types::{IS_AUTHENTICATED_KEY, USER_KEY, VISITORS_KEY};
use crate::storage::KeyValueStore;
use crate::visitor_ledger::{FormField, VisitorStatus};

fn config(dir: &TempDir, backend: StorageBackend, file: &str) -> Config {
    let mut config = Config::default();
    config.storage.backend = backend;
    config.storage.path = dir.path().join(file);
    config.auth.simulated_latency_ms = 0;
    config.registration.simulated_latency_ms = 0;
    config
}

fn fields() -> Vec<(FormField, String)> {
    vec![
        (FormField::FullName, "Zanele Hlophe".to_string()),
        (FormField::IdNumber, "9512250321".to_string()),
        (FormField::PhoneNumber, "7688 4521".to_string()),
        (FormField::Purpose, "Audit follow-up".to_string()),
        (FormField::PersonToVisit, "Mrs. Motsa".to_string()),
        (FormField::ExpectedDuration, "Full day".to_string()),
        (FormField::VehicleReg, "PSD 123 AH".to_string()),
    ]
}

#[test]
fn test_session_and_ledger_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::File, "store.json");

    let code = {
        let controller = Controller::new(config.clone()).unwrap();
        assert_ok!(controller.login("guard", "admin123"));
        let record = controller.register(&fields(), "Policy Analysis").unwrap();
        assert_eq!(record.floor, 3);
        record.registration_code
    };

    let controller = Controller::new(config.clone()).unwrap();
    let session = controller.whoami().unwrap().expect("session persisted");
    assert_eq!(session.user.username, "guard");

    let stored = controller.ledger().find(&code).unwrap().expect("record persisted");
    assert_eq!(stored.vehicle_reg.as_deref(), Some("PSD 123 AH"));
    assert_eq!(stored.status, VisitorStatus::CheckedIn);

    let raw = FileStorage::new(&config.storage.path).unwrap();
    assert_eq!(raw.get(IS_AUTHENTICATED_KEY).unwrap().as_deref(), Some("true"));
    assert!(raw.get(USER_KEY).unwrap().is_some());
    assert!(raw.get(VISITORS_KEY).unwrap().unwrap().contains(&code));
}

#[test]
fn test_failed_login_and_incomplete_registration_write_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::File, "store.json");
    let controller = Controller::new(config.clone()).unwrap();

    let err = assert_err!(controller.login("guard", "letmein"));
    assert!(matches!(
        err,
        ControllerError::AuthError(AuthError::InvalidCredentials)
    ));
    assert!(controller.whoami().unwrap().is_none());

    controller.login("guard", "admin123").unwrap();
    let mut incomplete = fields();
    incomplete.retain(|(field, _)| *field != FormField::PersonToVisit);
    let err = assert_err!(controller.register(&incomplete, "Policy Analysis"));
    assert!(matches!(
        err,
        ControllerError::RegistrationError(RegistrationError::MissingFields(_))
    ));

    let raw = FileStorage::new(&config.storage.path).unwrap();
    assert_eq!(raw.get(VISITORS_KEY).unwrap(), None);
}

#[test]
fn test_database_backend_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, StorageBackend::Database, "vms.sqlite3");

    let code = {
        let controller = Controller::new(config.clone()).unwrap();
        controller.login("guard", "admin123").unwrap();
        controller
            .register(&fields(), "Ministry of Finance")
            .unwrap()
            .registration_code
    };

    let controller = Controller::new(config).unwrap();
    assert!(controller.whoami().unwrap().is_some());
    let record = controller.check_out(&code).unwrap();
    assert_eq!(record.status, VisitorStatus::CheckedOut);
    assert_eq!(controller.ledger().len().unwrap(), 1);
}

#[test]
fn test_shared_store_between_services() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStorage::new(dir.path().join("shared.json")).unwrap());
    let config = config(&dir, StorageBackend::File, "unused.json");

    let desk = Controller::with_store(config.clone(), store.clone());
    let office = Controller::with_store(config, store);
    desk.login("guard", "admin123").unwrap();
    assert!(office.whoami().unwrap().is_some());
    office.logout().unwrap();
    assert!(desk.whoami().unwrap().is_none());
}
