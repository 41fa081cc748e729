//! Generic record filtering, sorting and searching
//!
//! Operates on arbitrary JSON records (bookings, rooms, promotions) so table
//! views can offload work without a typed model per list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    /// Field name to expected value: an array (all must match), a
    /// `{min, max}` range, or a scalar compared for equality
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFilterTask {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub filters: FilterOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortTask {
    #[serde(default)]
    pub data: Vec<Value>,
    pub sort_by: String,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTask {
    #[serde(default)]
    pub items: Vec<Value>,
    pub search_term: String,
    /// Dot paths such as `guest.name`
    pub search_fields: Vec<String>,
}

/// Search term, then per-field filters, then an optional sort.
pub fn filter_data(task: DataFilterTask) -> Vec<Value> {
    let DataFilterTask { mut data, filters } = task;

    if let Some(term) = filters.search_term.as_deref().filter(|t| !t.is_empty()) {
        let needle = term.to_lowercase();
        data.retain(|item| any_string_field_contains(item, &needle));
    }

    for (field, expected) in &filters.filters {
        if is_blank(expected) {
            continue;
        }
        data.retain(|item| field_matches(item.get(field), expected));
    }

    if let Some(sort_by) = filters.sort_by.as_deref() {
        sort_by_field(&mut data, sort_by, filters.sort_order);
    }

    data
}

pub fn sort_data(task: SortTask) -> Vec<Value> {
    let SortTask {
        mut data,
        sort_by,
        sort_order,
    } = task;
    sort_by_field(&mut data, &sort_by, sort_order);
    data
}

/// Items where any listed field contains the term. Strings match
/// case-insensitively; numbers match on their decimal rendering.
pub fn search_items(task: SearchTask) -> Vec<Value> {
    let SearchTask {
        mut items,
        search_term,
        search_fields,
    } = task;
    let needle = search_term.to_lowercase();

    items.retain(|item| {
        search_fields
            .iter()
            .filter_map(|path| lookup_path(item, path))
            .any(|value| match value {
                Value::String(s) => s.to_lowercase().contains(&needle),
                Value::Number(n) => n.to_string().contains(&search_term),
                _ => false,
            })
    });
    items
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn any_string_field_contains(item: &Value, needle_lower: &str) -> bool {
    match item {
        Value::Object(map) => map.values().any(|value| match value {
            Value::String(s) => s.to_lowercase().contains(needle_lower),
            _ => false,
        }),
        _ => false,
    }
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match expected {
        Value::Array(wanted) => wanted.iter().all(|w| match actual {
            Some(Value::Array(have)) => have.contains(w),
            Some(value) => value == w,
            None => false,
        }),
        Value::Object(range) if range.contains_key("min") && range.contains_key("max") => {
            let Some(actual) = actual else {
                return false;
            };
            let above_min = matches!(
                compare_values(actual, &range["min"]),
                Some(Ordering::Greater | Ordering::Equal)
            );
            let below_max = matches!(
                compare_values(actual, &range["max"]),
                Some(Ordering::Less | Ordering::Equal)
            );
            above_min && below_max
        }
        scalar => actual == Some(scalar),
    }
}

/// Stable sort; records missing the field, or holding null, go last in
/// either direction.
fn sort_by_field(data: &mut [Value], field: &str, order: SortOrder) {
    data.sort_by(|a, b| {
        let a = a.get(field).filter(|v| !v.is_null());
        let b = b.get(field).filter(|v| !v.is_null());
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => {
                let ordering = sort_key_order(a, b);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
        }
    });
}

/// Total order for sorting: numbers, then strings, then booleans, then
/// arrays and objects. Values of the same kind compare as in
/// [`compare_values`]; arrays and objects tie among themselves.
fn sort_key_order(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Number(_) => 0,
            Value::String(_) => 1,
            Value::Bool(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
            Value::Null => 4,
        }
    }

    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().unwrap_or(0.0).total_cmp(&b.as_f64().unwrap_or(0.0))
        }
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal)),
    }
}

/// Orders numbers numerically, strings lexically and booleans false-first.
/// Mixed types are incomparable, so a range filter never matches across kinds.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn lookup_path<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(item, |current, segment| current.get(segment))
        .filter(|value| !value.is_null())
}
