//! Query parameter DTOs for cached backend reads
//!
//! Each struct serializes (camelCase, `None` fields dropped) both to the
//! backend query string and to the cache key, so two calls with the same
//! filters always share an entry.

use serde::{Deserialize, Serialize};

/// Parameters of `GET /public/hotels/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "comma_list")]
    pub stars: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "comma_list")]
    pub amenities: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// Filters of `GET /host/bookings`; the hotel is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostBookingFilters {
    pub hotel_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Filters shared by the analytics and earnings endpoints and workers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Lists travel as `1,2,3` in query strings, matching what the backend
/// expects; JSON arrays are accepted too.
mod comma_list {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &Option<Vec<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        match value {
            Some(items) => serializer.serialize_str(
                &items.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            ),
            None => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        List(Vec<T>),
        Joined(String),
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + Deserialize<'de>,
        T::Err: Display,
    {
        match Option::<Raw<T>>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::List(items)) => Ok(Some(items)),
            Some(Raw::Joined(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Joined(s)) => s
                .split(',')
                .map(|part| part.trim().parse::<T>().map_err(de::Error::custom))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
        }
    }
}
