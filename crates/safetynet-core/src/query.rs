//! Composite dispatch queries.
//!
//! Every query joins the three stores on identity keys: persons reach a
//! station through the address mapping and their medical record through
//! their name. A query takes one view of each store when it starts and
//! answers entirely from those views, so a concurrent write is either fully
//! visible or not at all. Queries never mutate; a query that matches
//! nothing returns an empty result.

use std::collections::HashSet;
use std::sync::Arc;

use safetynet_store::{DataStores, StoreView};
use safetynet_types::{
    AddressKey, AddressReport, CoveredPerson, FireStation, FloodReport, FloodResident,
    MedicalRecord, Person, PersonInfo, Resident, StationAssignment, StationCoverage, StationId,
    same_text,
};
use tracing::debug;

use crate::age::{AgeGroup, Clock, SystemClock, age_from_birthdate};

/// Read-only query facade over the data stores.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    stores: Arc<DataStores>,
    clock: Arc<dyn Clock>,
}

impl QueryEngine {
    /// Create an engine reading `stores` with ages computed against `clock`.
    pub fn new(stores: Arc<DataStores>, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    /// Create an engine using the host's local date.
    pub fn with_system_clock(stores: Arc<DataStores>) -> Self {
        Self::new(stores, Arc::new(SystemClock))
    }

    fn tables(&self) -> Tables<'_> {
        Tables {
            persons: self.stores.persons.view(),
            fire_stations: self.stores.fire_stations.view(),
            medical_records: self.stores.medical_records.view(),
            clock: &*self.clock,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Persons living at any address served by `station`, with head counts.
    pub fn coverage_by_station(&self, station: &StationId) -> StationCoverage {
        debug!(station = %station, "Coverage query");
        let tables = self.tables();
        let addresses = tables.addresses_for(&[station.clone()]);
        let mut coverage = StationCoverage::default();

        for person in tables.persons_at_any(&addresses) {
            match tables.age_of(person).map_or(AgeGroup::Unknown, AgeGroup::of) {
                AgeGroup::Child => coverage.child_count = coverage.child_count.saturating_add(1),
                AgeGroup::Adult => coverage.adult_count = coverage.adult_count.saturating_add(1),
                AgeGroup::Unknown => {}
            }
            coverage.persons.push(CoveredPerson {
                first_name: person.first_name.clone(),
                last_name: person.last_name.clone(),
                address: person.address.clone(),
                phone: person.phone.clone(),
            });
        }
        coverage
    }

    /// Residents of every address served by any of `stations`, by address.
    pub fn flood_info(&self, stations: &[StationId]) -> FloodReport {
        debug!(stations = stations.len(), "Flood query");
        let tables = self.tables();
        let mut report = FloodReport::new();

        for (key, spelling) in tables.addresses_for(stations) {
            let residents = tables
                .residents_of(&key)
                .map(|person| {
                    let record = tables.medical_record_of(person);
                    FloodResident {
                        age: record.map(|r| tables.age_from(r)),
                        medications: record.map(|r| r.medications.clone()),
                        allergies: record.map(|r| r.allergies.clone()),
                        first_name: person.first_name.clone(),
                        last_name: person.last_name.clone(),
                        phone: person.phone.clone(),
                    }
                })
                .collect();
            report.insert(spelling, residents);
        }
        report
    }

    /// Everyone at `address` plus the station covering it.
    pub fn residents_at_address(&self, address: &str) -> AddressReport {
        debug!(address, "Address query");
        let tables = self.tables();
        let key = AddressKey::new(address);
        let station = tables
            .fire_stations
            .get(&key)
            .map_or(StationAssignment::NotApplicable, |mapping| {
                StationAssignment::Assigned(mapping.station.clone())
            });

        let residents = tables
            .residents_of(&key)
            .map(|person| {
                let (age, medications, allergies) = tables.medical_summary(person);
                Resident {
                    first_name: person.first_name.clone(),
                    last_name: person.last_name.clone(),
                    phone: person.phone.clone(),
                    age,
                    medications,
                    allergies,
                }
            })
            .collect();

        AddressReport { station, residents }
    }

    /// One line per child at `address`, naming the other household members.
    pub fn children_at_address(&self, address: &str) -> Vec<String> {
        debug!(address, "Child alert query");
        let tables = self.tables();
        let key = AddressKey::new(address);
        let household: Vec<&Person> = tables.residents_of(&key).collect();

        household
            .iter()
            .copied()
            .filter_map(|child| {
                let age = tables.age_of(child)?;
                if AgeGroup::of(age) != AgeGroup::Child {
                    return None;
                }
                let child_key = child.key();
                let others = household
                    .iter()
                    .copied()
                    .filter(|member| member.key() != child_key)
                    .map(Person::full_name)
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!(
                    "Child: {}, Age: {age}, Other members: {others}",
                    child.full_name()
                ))
            })
            .collect()
    }

    /// Distinct phone numbers of persons served by `station`.
    pub fn phone_numbers_for_station(&self, station: &StationId) -> Vec<String> {
        debug!(station = %station, "Phone alert query");
        let tables = self.tables();
        let addresses = tables.addresses_for(&[station.clone()]);
        distinct_present(
            tables
                .persons_at_any(&addresses)
                .into_iter()
                .map(|person| person.phone.as_deref()),
        )
    }

    /// Contact and medical summary for everyone with `last_name`.
    pub fn person_info_by_last_name(&self, last_name: &str) -> Vec<PersonInfo> {
        debug!(last_name, "Person info query");
        let tables = self.tables();
        tables
            .persons
            .records()
            .iter()
            .filter(|person| same_text(&person.last_name, last_name))
            .map(|person| {
                let (age, medications, allergies) = tables.medical_summary(person);
                PersonInfo {
                    first_name: person.first_name.clone(),
                    last_name: person.last_name.clone(),
                    address: person.address.clone(),
                    email: person.email.clone(),
                    age,
                    medications,
                    allergies,
                }
            })
            .collect()
    }

    /// Distinct emails of persons living in `city`.
    pub fn emails_by_city(&self, city: &str) -> Vec<String> {
        debug!(city, "Community email query");
        let persons = self.stores.persons.view();
        distinct_present(
            persons
                .records()
                .iter()
                .filter(|person| person.city.as_deref().is_some_and(|c| same_text(c, city)))
                .map(|person| person.email.as_deref()),
        )
    }
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

/// The views one query answers from, plus the clock ages are computed on.
struct Tables<'a> {
    persons: StoreView<Person>,
    fire_stations: StoreView<FireStation>,
    medical_records: StoreView<MedicalRecord>,
    clock: &'a dyn Clock,
}

impl Tables<'_> {
    /// Addresses mapped to any of `stations`, first spelling kept.
    fn addresses_for(&self, stations: &[StationId]) -> Vec<(AddressKey, String)> {
        let mut seen = HashSet::new();
        self.fire_stations
            .records()
            .iter()
            .filter(|mapping| stations.contains(&mapping.station))
            .filter_map(|mapping| {
                let key = mapping.key();
                seen.insert(key.clone()).then(|| (key, mapping.address.clone()))
            })
            .collect()
    }

    /// Persons living at `address`, in store order.
    fn residents_of<'t>(&'t self, address: &'t AddressKey) -> impl Iterator<Item = &'t Person> {
        self.persons
            .records()
            .iter()
            .filter(move |person| person.lives_at(address))
    }

    /// Persons living at any of `addresses`, in store order.
    fn persons_at_any(&self, addresses: &[(AddressKey, String)]) -> Vec<&Person> {
        if addresses.is_empty() {
            return Vec::new();
        }
        self.persons
            .records()
            .iter()
            .filter(|person| addresses.iter().any(|(key, _)| person.lives_at(key)))
            .collect()
    }

    fn medical_record_of(&self, person: &Person) -> Option<&MedicalRecord> {
        self.medical_records.get(&person.key())
    }

    fn age_from(&self, record: &MedicalRecord) -> i32 {
        age_from_birthdate(record.birthdate.as_deref(), self.clock)
    }

    /// Age from the person's medical record; `None` without a record.
    fn age_of(&self, person: &Person) -> Option<i32> {
        self.medical_record_of(person).map(|record| self.age_from(record))
    }

    /// Age and medical lists, with `None` and empty lists for no record.
    fn medical_summary(&self, person: &Person) -> (Option<i32>, Vec<String>, Vec<String>) {
        self.medical_record_of(person).map_or_else(
            || (None, Vec::new(), Vec::new()),
            |record| {
                (
                    Some(self.age_from(record)),
                    record.medications.clone(),
                    record.allergies.clone(),
                )
            },
        )
    }
}

/// Non-blank values in first-occurrence order, duplicates dropped.
fn distinct_present<'v>(values: impl Iterator<Item = Option<&'v str>>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .flatten()
        .filter(|value| !value.trim().is_empty())
        .filter(|value| seen.insert(*value))
        .map(str::to_owned)
        .collect()
}
