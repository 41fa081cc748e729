//! Booking models
//!
//! Host-side booking records used by the analytics and dashboard workers.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// == Booking Status ==
/// Booking lifecycle state. Unrecognised states are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    Completed,
    Cancelled,
    #[default]
    Unknown,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Unknown => "UNKNOWN",
            BookingStatus::Other(s) => s,
        }
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => BookingStatus::Pending,
            "CONFIRMED" => BookingStatus::Confirmed,
            "CHECKED_IN" => BookingStatus::CheckedIn,
            "COMPLETED" => BookingStatus::Completed,
            "CANCELLED" => BookingStatus::Cancelled,
            "" | "UNKNOWN" => BookingStatus::Unknown,
            _ => BookingStatus::Other(s),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Booking ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(default, deserialize_with = "status_or_unknown")]
    pub status: BookingStatus,
    /// Accepts numbers or numeric strings; anything else counts as zero
    #[serde(default, deserialize_with = "lenient_price")]
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    pub fn is_completed(&self) -> bool {
        self.status == BookingStatus::Completed
    }

    /// Check-in date, falling back to the creation time.
    pub fn check_in_or_created(&self) -> Option<NaiveDateTime> {
        first_date(&self.check_in_date, &self.created_at)
    }

    /// Check-out date, falling back to the creation time.
    pub fn check_out_or_created(&self) -> Option<NaiveDateTime> {
        first_date(&self.check_out_date, &self.created_at)
    }

    pub fn check_in(&self) -> Option<NaiveDateTime> {
        self.check_in_date.as_deref().and_then(parse_datetime)
    }

    pub fn check_out(&self) -> Option<NaiveDateTime> {
        self.check_out_date.as_deref().and_then(parse_datetime)
    }

    pub fn checked_out(&self) -> Option<NaiveDateTime> {
        self.checked_out_at.as_deref().and_then(parse_datetime)
    }

    /// Label used when grouping earnings per hotel.
    pub fn hotel_label(&self) -> String {
        match (&self.hotel_name, self.hotel_id) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(id)) => format!("Hotel {id}"),
            _ => "Hotel unknown".to_string(),
        }
    }
}

fn first_date(primary: &Option<String>, fallback: &Option<String>) -> Option<NaiveDateTime> {
    match primary.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => parse_datetime(s),
        None => fallback.as_deref().and_then(parse_datetime),
    }
}

/// Parses the date shapes the backend emits: RFC 3339, naive ISO datetimes
/// and plain `YYYY-MM-DD` dates (read as midnight).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `YYYY-MM` bucket for monthly aggregates.
pub fn month_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m").to_string()
}

fn status_or_unknown<'de, D>(deserializer: D) -> Result<BookingStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(BookingStatus::from).unwrap_or_default())
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(price_from_value(&raw))
}

/// Like `lenient_price`, but an explicit `null` stays absent.
pub(crate) fn lenient_optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok((!raw.is_null()).then(|| price_from_value(&raw)))
}

/// Reads a price from a JSON number or a string with a leading number.
pub fn price_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => leading_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    s[..end].parse().ok().filter(|v: &f64| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_roundtrip_keeps_unknown_values() {
        let booking: Booking = serde_json::from_value(json!({"status": "REFUNDED"})).unwrap();
        assert_eq!(booking.status, BookingStatus::Other("REFUNDED".to_string()));
        assert_eq!(serde_json::to_value(&booking).unwrap()["status"], json!("REFUNDED"));
    }

    #[test]
    fn test_missing_or_null_status_is_unknown() {
        let missing: Booking = serde_json::from_value(json!({})).unwrap();
        let null: Booking = serde_json::from_value(json!({"status": null})).unwrap();
        assert_eq!(missing.status, BookingStatus::Unknown);
        assert_eq!(null.status, BookingStatus::Unknown);
    }

    #[test]
    fn test_price_accepts_numbers_and_strings() {
        let numeric: Booking = serde_json::from_value(json!({"totalPrice": 150.5})).unwrap();
        let text: Booking = serde_json::from_value(json!({"totalPrice": "99.90"})).unwrap();
        let junk: Booking = serde_json::from_value(json!({"totalPrice": "n/a"})).unwrap();
        assert_eq!(numeric.total_price, 150.5);
        assert_eq!(text.total_price, 99.9);
        assert_eq!(junk.total_price, 0.0);
    }

    #[test]
    fn test_parse_datetime_shapes() {
        let date = parse_datetime("2024-05-01").unwrap();
        let naive = parse_datetime("2024-05-01T10:30:00").unwrap();
        let zoned = parse_datetime("2024-05-01T10:30:00Z").unwrap();
        assert_eq!(month_key(&date), "2024-05");
        assert_eq!(naive, zoned);
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_check_in_falls_back_to_created_at() {
        let booking = Booking {
            created_at: Some("2024-03-10T08:00:00".to_string()),
            ..Default::default()
        };
        assert_eq!(month_key(&booking.check_in_or_created().unwrap()), "2024-03");
    }

    #[test]
    fn test_hotel_label() {
        let named = Booking {
            hotel_name: Some("Sea Breeze".to_string()),
            hotel_id: Some(1),
            ..Default::default()
        };
        let unnamed = Booking {
            hotel_id: Some(7),
            ..Default::default()
        };
        assert_eq!(named.hotel_label(), "Sea Breeze");
        assert_eq!(unnamed.hotel_label(), "Hotel 7");
    }
}
