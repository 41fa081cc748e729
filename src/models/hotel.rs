//! Hotel models
//!
//! Hotels as returned by the public search and host endpoints. Only the
//! fields the client computes on are typed; everything else is carried in
//! `extra` so a hotel survives a round-trip through a worker unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Cheapest room price; hotels without one are treated as free.
    /// Numeric strings are accepted like booking prices.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::models::booking::lenient_optional_price"
    )]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<AmenityRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<Room>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hotel {
    pub fn amenity_ids(&self) -> Vec<u64> {
        self.amenities
            .iter()
            .flatten()
            .map(AmenityRef::id)
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.as_ref().map_or(0, Vec::len)
    }

    /// Case-insensitive substring match over name, description, city and address.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        [&self.name, &self.description, &self.city, &self.address]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Amenities arrive either as bare ids or as full objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmenityRef {
    Id(u64),
    Detailed(Amenity),
}

impl AmenityRef {
    pub fn id(&self) -> u64 {
        match self {
            AmenityRef::Id(id) => *id,
            AmenityRef::Detailed(amenity) => amenity.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Room {
    /// A room without a capacity fits anyone; only an explicit `false` marks it unavailable.
    pub fn can_host(&self, guests: u32) -> bool {
        if matches!(self.capacity, Some(capacity) if capacity < guests) {
            return false;
        }
        self.is_available != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hotel_deserialize_keeps_unknown_fields() {
        let hotel: Hotel = serde_json::from_value(json!({
            "id": 3,
            "name": "Sea Breeze",
            "minPrice": 120.0,
            "starRating": 4,
            "latitude": 16.05
        }))
        .unwrap();

        assert_eq!(hotel.id, Some(3));
        assert_eq!(hotel.star_rating, Some(4));
        assert_eq!(hotel.extra.get("latitude"), Some(&json!(16.05)));

        let back = serde_json::to_value(&hotel).unwrap();
        assert_eq!(back["latitude"], json!(16.05));
        assert_eq!(back["minPrice"], json!(120.0));
    }

    #[test]
    fn test_min_price_accepts_numeric_strings() {
        let hotels: Vec<Hotel> = serde_json::from_value(json!([
            {"id": 1, "minPrice": "120.00"},
            {"id": 2, "minPrice": "n/a"},
            {"id": 3, "minPrice": null},
            {"id": 4}
        ]))
        .unwrap();

        let prices: Vec<Option<f64>> = hotels.iter().map(|h| h.min_price).collect();
        assert_eq!(prices, vec![Some(120.0), Some(0.0), None, None]);
    }

    #[test]
    fn test_amenity_ids_from_mixed_shapes() {
        let hotel: Hotel = serde_json::from_value(json!({
            "amenities": [1, {"id": 2, "name": "Pool"}]
        }))
        .unwrap();

        assert_eq!(hotel.amenity_ids(), vec![1, 2]);
    }

    #[test]
    fn test_matches_text() {
        let hotel = Hotel {
            city: Some("Da Nang".to_string()),
            ..Default::default()
        };
        assert!(hotel.matches_text("nang"));
        assert!(!hotel.matches_text("hue"));
    }

    #[test]
    fn test_room_can_host() {
        let small = Room {
            capacity: Some(2),
            ..Default::default()
        };
        let closed = Room {
            is_available: Some(false),
            ..Default::default()
        };
        assert!(small.can_host(2));
        assert!(!small.can_host(3));
        assert!(!closed.can_host(1));
        assert!(Room::default().can_host(10));
    }
}
