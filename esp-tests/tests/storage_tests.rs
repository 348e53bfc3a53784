//! Integration Tests für den persistenten Credential Store
//!
//! PersistentCredentialStore läuft gegen einen RAM-Sektor.

mod common;

use common::RamStorageDriver;
use esp_core::error::StorageError;
use esp_core::storage::{PersistentCredentialStore, RECORD_SIZE, encode_record};
use esp_core::traits::CredentialStore;
use esp_core::types::NetworkCredentials;

fn store() -> PersistentCredentialStore<RamStorageDriver> {
    PersistentCredentialStore::new(RamStorageDriver::default())
}

#[test]
fn test_erased_sector_has_no_credentials() {
    let mut store = store();
    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_save_then_load() {
    let mut store = store();
    let credentials = NetworkCredentials::new("Office", "secret123", "abc").unwrap();

    store.save(&credentials).unwrap();

    assert_eq!(store.load(), Ok(Some(credentials)));
    assert_eq!(store.driver().write_count, 1);
}

#[test]
fn test_clear_erases_sector() {
    let mut store = store();
    store
        .save(&NetworkCredentials::new("Office", "pw", "").unwrap())
        .unwrap();

    store.clear().unwrap();

    assert_eq!(store.load(), Ok(None));
    assert_eq!(store.driver().erase_count, 1);
    assert_eq!(store.driver().data, [0xFF; RECORD_SIZE]);
}

#[test]
fn test_empty_ssid_counts_as_absent() {
    let mut store = store();
    store
        .save(&NetworkCredentials::new("", "pw", "tok").unwrap())
        .unwrap();

    assert_eq!(store.load(), Ok(None));
}

#[test]
fn test_clear_then_save_drops_old_token() {
    let mut store = store();
    store
        .save(&NetworkCredentials::new("Home", "pw", "old-token").unwrap())
        .unwrap();

    store.clear().unwrap();
    store
        .save(&NetworkCredentials::new("Office", "secret123", "").unwrap())
        .unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.ssid.as_str(), "Office");
    assert_eq!(loaded.password.as_str(), "secret123");
    assert_eq!(loaded.token.as_str(), "");
}

#[test]
fn test_corrupt_record_is_an_error() {
    let mut driver = RamStorageDriver::default();
    driver.data = encode_record(&NetworkCredentials::new("Home", "pw", "").unwrap()).unwrap();
    // Länge des Namespace zerstören
    driver.data[2] = 0xF0;
    let mut store = PersistentCredentialStore::new(driver);

    assert_eq!(store.load(), Err(StorageError::InvalidData));
}

#[test]
fn test_driver_failures_propagate() {
    let mut driver = RamStorageDriver::default();
    driver.fail_read = true;
    driver.fail_write = true;
    let mut store = PersistentCredentialStore::new(driver);

    assert_eq!(store.load(), Err(StorageError::DriverError));
    assert_eq!(
        store.save(&NetworkCredentials::new("Home", "", "").unwrap()),
        Err(StorageError::DriverError)
    );
}
