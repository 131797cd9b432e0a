//! Longitude-only "opposite city" heuristic.
//!
//! Latitude is ignored on purpose: the opposite of a city is the registry
//! entry whose longitude is circularly closest to `lng + 180`, not the true
//! geographic antipode.

use shared::domain::{CityId, CityRecord};

/// `lng + 180`, wrapped back into (-180, 180].
pub fn target_longitude(lng: f64) -> f64 {
    let target = lng + 180.0;
    if target > 180.0 {
        target - 360.0
    } else {
        target
    }
}

pub fn circular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff)
}

/// Scans `cities` in order and returns the first city at minimal distance
/// from the source's target longitude. With no other city available the
/// source id comes back unchanged.
pub fn resolve_antipode(source: &CityRecord, cities: &[CityRecord]) -> CityId {
    let target = target_longitude(source.lng);
    let mut best: Option<(&CityRecord, f64)> = None;

    for city in cities.iter().filter(|city| city.id != source.id) {
        let distance = circular_distance(city.lng, target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((city, distance)),
        }
    }

    best.map(|(city, _)| city.id.clone())
        .unwrap_or_else(|| source.id.clone())
}
