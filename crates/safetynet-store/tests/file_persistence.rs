//! Integration tests for file-backed persistence.
//!
//! Every test works in its own temporary directory, so seeding and
//! write-through behavior are exercised against a real filesystem without
//! touching the repository's data files.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::path::Path;
use std::sync::Arc;
use std::thread;

use safetynet_store::{DataStores, PersistenceGateway};
use safetynet_types::{AddressKey, DataDocument, FireStation, NameKey, Person, StationId};
use tempfile::TempDir;

const SEED: &str = r#"{
  "persons": [
    {"firstName":"John","lastName":"Boyd","address":"1509 Culver St","city":"Culver","zip":"97451","phone":"841-874-6512","email":"jaboyd@email.com"},
    {"firstName":"Jacob","lastName":"Boyd","address":"1509 Culver St","city":"Culver","zip":"97451","phone":"841-874-6513","email":"drk@email.com"}
  ],
  "firestations": [
    {"address":"1509 Culver St","station":"3"},
    {"address":"29 15th St","station":2}
  ],
  "medicalrecords": [
    {"firstName":"John","lastName":"Boyd","birthdate":"03/06/1984","medications":["aznol:350mg"],"allergies":["nillacilan"]},
    {"firstName":"Jacob","lastName":"Boyd","birthdate":"03/06/2012"}
  ]
}"#;

fn write_seed(dir: &TempDir) -> std::path::PathBuf {
    let seed = dir.path().join("seed.json");
    std::fs::write(&seed, SEED).unwrap();
    seed
}

fn read_document(path: &Path) -> DataDocument {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

fn person(first: &str, last: &str) -> Person {
    Person {
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        address: Some("892 Downing Ct".to_owned()),
        city: Some("Culver".to_owned()),
        zip: Some("97451".to_owned()),
        phone: Some("841-874-7878".to_owned()),
        email: Some("soph@email.com".to_owned()),
    }
}

#[test]
fn seed_is_copied_on_first_open() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("nested").join("data").join("data.json");

    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    assert!(writable.exists());
    assert_eq!(stores.persons.len(), 2);
    assert_eq!(stores.fire_stations.len(), 2);
    assert_eq!(stores.medical_records.len(), 2);
}

#[test]
fn existing_writable_file_is_not_overwritten_by_seed() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    std::fs::write(&writable, r#"{"persons":[],"firestations":[],"medicalrecords":[]}"#).unwrap();

    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    assert!(stores.persons.is_empty());
    assert!(stores.fire_stations.is_empty());
}

#[test]
fn missing_seed_starts_empty() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(PersistenceGateway::from_files(
        dir.path().join("absent.json"),
        dir.path().join("data.json"),
    ));
    let stores = DataStores::open(&gateway);

    assert!(stores.persons.is_empty());
    assert!(stores.medical_records.is_empty());
    assert_eq!(stores.reload_all().unwrap().persons, 0);
}

#[test]
fn mutations_write_through_and_preserve_other_sections() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    stores.persons.upsert(person("Sophia", "Zemicks"));
    stores.fire_stations.upsert(FireStation {
        address: "892 Downing Ct".to_owned(),
        station: StationId::new("2"),
    });
    assert!(stores.medical_records.delete(&NameKey::new("jacob", "boyd")));

    let document = read_document(&writable);
    assert_eq!(document.persons.len(), 3);
    assert_eq!(document.firestations.len(), 3);
    assert_eq!(document.medicalrecords.len(), 1);
    assert_eq!(document.medicalrecords[0].medications, vec!["aznol:350mg"]);

    // The seed itself is never modified.
    let seed_document = read_document(&seed);
    assert_eq!(seed_document.persons.len(), 2);
}

#[test]
fn reopen_sees_persisted_state_in_order() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");

    {
        let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
        let stores = DataStores::open(&gateway);
        stores.persons.upsert(person("Sophia", "Zemicks"));
        assert!(stores.persons.delete(&NameKey::new("John", "Boyd")));
    }

    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);
    let names: Vec<String> = stores
        .persons
        .list_all()
        .iter()
        .map(Person::full_name)
        .collect();
    assert_eq!(names, vec!["Jacob Boyd", "Sophia Zemicks"]);
}

#[test]
fn reload_picks_up_external_edits() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    std::fs::write(
        &writable,
        r#"{"firestations":[{"address":"644 Gershwin Cir","station":"1"}]}"#,
    )
    .unwrap();

    let summary = stores.reload_all().unwrap();
    assert_eq!(summary.persons, 0);
    assert_eq!(summary.firestations, 1);
    assert!(
        stores
            .fire_stations
            .find_by_key(&AddressKey::new("644 GERSHWIN CIR"))
            .is_some()
    );
}

#[test]
fn reload_of_corrupt_file_is_a_hard_failure() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    std::fs::write(&writable, "{ not json").unwrap();

    assert!(stores.reload_all().is_err());
    assert!(stores.persons.is_empty());
}

#[test]
fn concurrent_writers_and_readers_stay_consistent() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = Arc::new(DataStores::open(&gateway));

    let mut handles = Vec::new();
    for worker in 0..4 {
        let stores = Arc::clone(&stores);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                stores.persons.upsert(person(&format!("W{worker}"), &format!("N{i}")));
                // Readers always see a whole snapshot with unique keys.
                let all = stores.persons.list_all();
                let mut keys: Vec<NameKey> = all.iter().map(Person::key).collect();
                let before = keys.len();
                keys.sort_by_key(ToString::to_string);
                keys.dedup();
                assert_eq!(keys.len(), before);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stores.persons.len(), 42);
    assert_eq!(read_document(&writable).persons.len(), 42);
    assert_eq!(read_document(&writable).firestations.len(), 2);
}

#[test]
fn bundled_seed_loads_with_duplicate_mappings_collapsed() {
    let seed = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/data.json");
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(PersistenceGateway::from_files(seed, dir.path().join("data.json")));
    let stores = DataStores::open(&gateway);

    assert_eq!(stores.persons.len(), 23);
    assert_eq!(stores.medical_records.len(), 23);
    // Two addresses appear twice in the seed; the later mapping wins.
    assert_eq!(stores.fire_stations.len(), 11);
    let steppes = stores
        .fire_stations
        .find_by_key(&AddressKey::new("112 Steppes Pl"))
        .unwrap();
    assert_eq!(steppes.station, StationId::new("4"));
}

#[test]
fn first_write_without_seed_creates_the_data_file() {
    let dir = TempDir::new().unwrap();
    let writable = dir.path().join("fresh").join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(
        dir.path().join("absent.json"),
        &writable,
    ));
    let stores = DataStores::open(&gateway);

    stores.persons.upsert(person("Sophia", "Zemicks"));

    assert_eq!(read_document(&writable).persons.len(), 1);
    assert_eq!(stores.persist_failures(), 0);
}

#[test]
fn write_into_corrupt_file_keeps_other_sections() {
    let dir = TempDir::new().unwrap();
    let seed = write_seed(&dir);
    let writable = dir.path().join("data.json");
    let gateway = Arc::new(PersistenceGateway::from_files(&seed, &writable));
    let stores = DataStores::open(&gateway);

    std::fs::write(&writable, "{half-written").unwrap();
    stores.persons.upsert(person("Sophia", "Zemicks"));

    let document = read_document(&writable);
    assert_eq!(document.persons.len(), 3);
    assert_eq!(document.firestations.len(), 2);
    assert_eq!(document.medicalrecords.len(), 2);

    let summary = stores.reload_all().unwrap();
    assert_eq!(summary.persons, 3);
    assert_eq!(summary.firestations, 2);
    assert_eq!(summary.medicalrecords, 2);
    assert_eq!(stores.persist_failures(), 0);
}
