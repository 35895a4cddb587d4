// src/domain/matching.rs
//
// Pure predicate deciding whether a driver's offer matches a passenger's
// pending request. Evaluated in application code over a batch-fetched
// candidate set; nothing is persisted, so a match set is always current.

use chrono::NaiveTime;

use crate::{
    config::MATCH_WINDOW_MINUTES,
    models::carpool::{CarpoolOffer, CarpoolRequest},
};

/// Case-insensitive substring containment in either direction.
/// "G-9" matches "G-9 Islamabad" and vice versa; there is no geocoding.
pub fn location_matches(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Pickup times must be within `MATCH_WINDOW_MINUTES` of each other.
pub fn within_pickup_window(a: NaiveTime, b: NaiveTime) -> bool {
    (a - b).num_minutes().abs() <= MATCH_WINDOW_MINUTES
}

/// Weekday overlap between two comma-joined day lists.
///
/// An offer without recurring days is a one-off ride and matches any
/// request day-wise; the clause is vacuously true.
pub fn days_overlap(offer_days: Option<&str>, request_days: Option<&str>) -> bool {
    let offer_days = match offer_days.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return true,
    };
    let request_days = match request_days.map(str::trim) {
        Some(d) if !d.is_empty() => d,
        _ => return false,
    };

    let requested: Vec<String> = request_days
        .split(',')
        .map(|d| d.trim().to_lowercase())
        .collect();

    offer_days
        .split(',')
        .map(|d| d.trim().to_lowercase())
        .any(|d| requested.contains(&d))
}

/// A request matches an offer when all three independent predicates hold:
/// both location strings overlap, pickup times are within the window, and
/// the recurring-day sets intersect (or the offer has none).
pub fn matches(offer: &CarpoolOffer, request: &CarpoolRequest) -> bool {
    location_matches(&offer.pickup_location, &request.pickup_location)
        && location_matches(&offer.dropoff_location, &request.dropoff_location)
        && within_pickup_window(offer.pickup_time, request.pickup_time)
        && days_overlap(offer.recurring_days.as_deref(), request.recurring_days.as_deref())
}
