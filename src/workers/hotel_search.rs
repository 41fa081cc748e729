//! Hotel search filter
//!
//! Narrows an already-fetched hotel list by the search form's criteria.

use serde::{Deserialize, Serialize};

use crate::models::Hotel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelFilterTask {
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(default)]
    pub filters: HotelFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelFilterResult {
    pub hotels: Vec<Hotel>,
    /// Always equal to `hotels.len()`
    pub count: usize,
    /// Criteria that matched at least one hotel, in first-match order
    pub matched_fields: Vec<&'static str>,
}

/// Applies text, price, star, amenity and availability criteria in turn.
pub fn filter_hotels(task: HotelFilterTask) -> HotelFilterResult {
    let HotelFilterTask { mut hotels, filters } = task;
    let mut matched: Vec<&'static str> = Vec::new();

    if let Some(query) = filters.query.as_deref().filter(|q| !q.is_empty()) {
        let needle = query.to_lowercase();
        narrow(&mut hotels, &mut matched, "text", |hotel| hotel.matches_text(&needle));
    }

    if filters.min_price.is_some() || filters.max_price.is_some() {
        narrow(&mut hotels, &mut matched, "price", |hotel| {
            let price = hotel.min_price.unwrap_or(0.0);
            filters.min_price.map_or(true, |min| price >= min)
                && filters.max_price.map_or(true, |max| price <= max)
        });
    }

    if let Some(stars) = filters.stars.as_ref().filter(|s| !s.is_empty()) {
        narrow(&mut hotels, &mut matched, "stars", |hotel| {
            hotel.star_rating.is_some_and(|rating| stars.contains(&rating))
        });
    }

    if let Some(wanted) = filters.amenities.as_ref().filter(|a| !a.is_empty()) {
        narrow(&mut hotels, &mut matched, "amenities", |hotel| {
            let offered = hotel.amenity_ids();
            wanted.iter().all(|id| offered.contains(id))
        });
    }

    let has_dates = filters.check_in.as_deref().is_some_and(|d| !d.is_empty())
        && filters.check_out.as_deref().is_some_and(|d| !d.is_empty());
    if has_dates {
        let guests = filters.guests.unwrap_or(1);
        narrow(&mut hotels, &mut matched, "availability", |hotel| has_room_for(hotel, guests));
    }

    HotelFilterResult {
        count: hotels.len(),
        hotels,
        matched_fields: matched,
    }
}

fn narrow(
    hotels: &mut Vec<Hotel>,
    matched: &mut Vec<&'static str>,
    field: &'static str,
    keep: impl Fn(&Hotel) -> bool,
) {
    hotels.retain(|hotel| keep(hotel));
    if !hotels.is_empty() && !matched.contains(&field) {
        matched.push(field);
    }
}

/// Hotels without room data are assumed to have space.
fn has_room_for(hotel: &Hotel, guests: u32) -> bool {
    match &hotel.rooms {
        Some(rooms) => rooms.iter().any(|room| room.can_host(guests)),
        None => true,
    }
}
