//! Read-only city registry.
//!
//! Iteration order is the insertion order of the records and never changes
//! after construction; the antipode tie-break depends on it.

use std::collections::HashSet;

use shared::domain::{CityId, CityRecord};
use thiserror::Error;

mod dataset;

pub use dataset::{intervention_catalog, CitySeed, CITY_SEEDS};

pub const NORTH_POLE_ID: &str = "north_pole";
pub const SOUTH_POLE_ID: &str = "south_pole";
pub const DEFAULT_PRIMARY_CITY_ID: &str = "delhi";

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("duplicate city id '{0}'")]
    DuplicateId(CityId),
    #[error("city '{id}' has latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { id: CityId, lat: f64 },
    #[error("city '{id}' has longitude {lng} outside (-180, 180]")]
    LongitudeOutOfRange { id: CityId, lng: f64 },
    #[error("city '{id}' has negative {field}")]
    NegativeMeasure { id: CityId, field: &'static str },
}

#[derive(Debug, Clone)]
pub struct CityRegistry {
    cities: Vec<CityRecord>,
}

impl CityRegistry {
    pub fn builtin() -> Self {
        Self {
            cities: CITY_SEEDS.iter().map(CitySeed::to_record).collect(),
        }
    }

    pub fn from_records(records: Vec<CityRecord>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.clone()) {
                return Err(RegistryError::DuplicateId(record.id.clone()));
            }
            validate_record(record)?;
        }
        Ok(Self { cities: records })
    }

    pub fn list_cities(&self) -> &[CityRecord] {
        &self.cities
    }

    pub fn get(&self, id: &CityId) -> Option<&CityRecord> {
        self.cities.iter().find(|city| &city.id == id)
    }

    pub fn contains(&self, id: &CityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// The preferred record when it is a reference point, otherwise the first
    /// reference record in iteration order.
    pub fn reference_baseline(&self, preferred: &CityId) -> Option<&CityRecord> {
        self.get(preferred)
            .filter(|city| city.is_reference)
            .or_else(|| self.cities.iter().find(|city| city.is_reference))
    }

    pub fn search(&self, query: &str) -> Vec<&CityRecord> {
        let needle = query.trim().to_lowercase();
        self.cities
            .iter()
            .filter(|city| {
                needle.is_empty()
                    || city.name.to_lowercase().contains(&needle)
                    || city.country.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

impl Default for CityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_record(record: &CityRecord) -> Result<(), RegistryError> {
    if !(-90.0..=90.0).contains(&record.lat) {
        return Err(RegistryError::LatitudeOutOfRange {
            id: record.id.clone(),
            lat: record.lat,
        });
    }
    if !(record.lng > -180.0 && record.lng <= 180.0) {
        return Err(RegistryError::LongitudeOutOfRange {
            id: record.id.clone(),
            lng: record.lng,
        });
    }
    for (field, value) in [("aqi", record.aqi), ("pm25", record.pm25)] {
        if value < 0.0 || value.is_nan() {
            return Err(RegistryError::NegativeMeasure {
                id: record.id.clone(),
                field,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_passes_validation() {
        let builtin = CityRegistry::builtin();
        let validated =
            CityRegistry::from_records(builtin.list_cities().to_vec()).expect("valid dataset");
        assert_eq!(validated.len(), CITY_SEEDS.len());
        assert_eq!(validated.list_cities()[0].id.as_str(), NORTH_POLE_ID);
    }

    #[test]
    fn reference_records_are_the_two_poles() {
        let registry = CityRegistry::builtin();
        let refs: Vec<&str> = registry
            .list_cities()
            .iter()
            .filter(|city| city.is_reference)
            .map(|city| city.id.as_str())
            .collect();
        assert_eq!(refs, vec![NORTH_POLE_ID, SOUTH_POLE_ID]);
    }

    #[test]
    fn baseline_prefers_requested_reference_and_falls_back() {
        let registry = CityRegistry::builtin();
        let south = registry
            .reference_baseline(&CityId::from(SOUTH_POLE_ID))
            .expect("south pole");
        assert_eq!(south.id.as_str(), SOUTH_POLE_ID);

        // delhi exists but is not a reference point
        let fallback = registry
            .reference_baseline(&CityId::from("delhi"))
            .expect("first reference");
        assert_eq!(fallback.id.as_str(), NORTH_POLE_ID);
    }

    #[test]
    fn derived_fields_follow_aqi() {
        let registry = CityRegistry::builtin();
        let delhi = registry.get(&CityId::from("delhi")).expect("delhi");
        assert_eq!(delhi.health_score, 0.0);
        assert_eq!(delhi.severity.label(), "Hazardous");
        let tokyo = registry.get(&CityId::from("tokyo")).expect("tokyo");
        assert_eq!(tokyo.health_score, 90.0);
    }

    #[test]
    fn search_matches_name_or_country_case_insensitively() {
        let registry = CityRegistry::builtin();
        let names: Vec<&str> = registry
            .search("INDIA")
            .into_iter()
            .map(|city| city.name.as_str())
            .collect();
        assert_eq!(names, vec!["Delhi", "Mumbai"]);
        assert_eq!(registry.search("   ").len(), registry.len());
        assert!(registry.search("atlantis").is_empty());
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_coordinates() {
        let registry = CityRegistry::builtin();
        let delhi = registry.get(&CityId::from("delhi")).expect("delhi").clone();

        let err = CityRegistry::from_records(vec![delhi.clone(), delhi.clone()])
            .expect_err("duplicate");
        assert_eq!(err, RegistryError::DuplicateId(CityId::from("delhi")));

        let mut wrapped = delhi.clone();
        wrapped.lng = -180.0;
        assert!(matches!(
            CityRegistry::from_records(vec![wrapped]),
            Err(RegistryError::LongitudeOutOfRange { .. })
        ));

        let mut negative = delhi;
        negative.pm25 = -1.0;
        assert!(matches!(
            CityRegistry::from_records(vec![negative]),
            Err(RegistryError::NegativeMeasure { field: "pm25", .. })
        ));
    }

    #[test]
    fn catalog_has_unique_kinds() {
        let catalog = intervention_catalog();
        let kinds: HashSet<_> = catalog.iter().map(|item| item.kind.clone()).collect();
        assert_eq!(kinds.len(), catalog.len());
    }
}
