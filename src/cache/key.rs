//! Cache Key Module
//!
//! Deterministic keys for parameterised read queries. Parameters are
//! flattened and sorted so that the same logical query always maps to the
//! same entry, whatever order its fields were supplied in.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Builds a cache key from a namespace and a parameter object.
///
/// Returns `base` unchanged when there are no parameters, otherwise
/// `base?k1=v1&k2=v2` with keys in lexicographic order. Nested objects are
/// flattened to `parent.child`, arrays are joined with `,` and `null`
/// values are left out. `%`, `&` and `=` are percent-encoded in names and
/// values, and `.` in name segments, so distinct parameters cannot render
/// to the same key.
pub fn generate_cache_key(base: &str, params: &Map<String, Value>) -> String {
    let pairs = sorted_pairs(params, true);

    if pairs.is_empty() {
        return base.to_string();
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}

/// Serializes `params` and builds a key from the resulting object.
///
/// `None` fields serialize to `null` and are therefore ignored, so a filter
/// struct with no filters set yields the bare namespace.
pub fn cache_key_for<T: Serialize + ?Sized>(base: &str, params: &T) -> Result<String> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(generate_cache_key(base, &map)),
        Value::Null => Ok(base.to_string()),
        other => Err(Error::InvalidRequest(format!(
            "cache key parameters must be an object, got {other}"
        ))),
    }
}

/// Flattened, sorted `(name, value)` pairs of a parameter struct, suitable
/// for a request query string.
pub fn query_pairs<T: Serialize + ?Sized>(params: &T) -> Result<Vec<(String, String)>> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(sorted_pairs(&map, false)),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::InvalidRequest(format!(
            "query parameters must be an object, got {other}"
        ))),
    }
}

fn sorted_pairs(params: &Map<String, Value>, escaped: bool) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    flatten_into(None, params, escaped, &mut pairs);
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

fn flatten_into(
    prefix: Option<&str>,
    map: &Map<String, Value>,
    escaped: bool,
    out: &mut Vec<(String, String)>,
) {
    for (key, value) in map {
        let segment = if escaped {
            escape(key, true)
        } else {
            key.clone()
        };
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{segment}"),
            None => segment,
        };
        match value {
            Value::Null => {}
            Value::Object(nested) => flatten_into(Some(&path), nested, escaped, out),
            other => {
                let rendered = render(other);
                let rendered = if escaped {
                    escape(&rendered, false)
                } else {
                    rendered
                };
                out.push((path, rendered));
            }
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn escape(part: &str, name_segment: bool) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '.' if name_segment => out.push_str("%2E"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_no_params_returns_base() {
        assert_eq!(generate_cache_key("host:hotels", &Map::new()), "host:hotels");
    }

    #[test]
    fn test_keys_are_sorted() {
        let key = generate_cache_key("search:hotels", &object(json!({"b": 2, "a": 1})));
        assert_eq!(key, "search:hotels?a=1&b=2");
    }

    #[test]
    fn test_order_independence() {
        let mut forward = Map::new();
        forward.insert("a".into(), json!(1));
        forward.insert("b".into(), json!(2));

        let mut reverse = Map::new();
        reverse.insert("b".into(), json!(2));
        reverse.insert("a".into(), json!(1));

        assert_eq!(
            generate_cache_key("base", &forward),
            generate_cache_key("base", &reverse)
        );
    }

    #[test]
    fn test_value_rendering() {
        let key = generate_cache_key(
            "search:hotels",
            &object(json!({
                "query": "da nang",
                "stars": [4, 5],
                "minPrice": 50.5,
                "flexible": true,
                "page": null
            })),
        );
        assert_eq!(
            key,
            "search:hotels?flexible=true&minPrice=50.5&query=da nang&stars=4,5"
        );
    }

    #[test]
    fn test_nested_objects_are_flattened() {
        let key = generate_cache_key(
            "base",
            &object(json!({"range": {"min": 1, "max": 9}, "a": "x"})),
        );
        assert_eq!(key, "base?a=x&range.max=9&range.min=1");
    }

    #[test]
    fn test_separators_in_names_and_values_do_not_collide() {
        let dotted = generate_cache_key("base", &object(json!({"a.b": 1})));
        let nested = generate_cache_key("base", &object(json!({"a": {"b": 1}})));
        assert_ne!(dotted, nested);
        assert_eq!(dotted, "base?a%2Eb=1");
        assert_eq!(nested, "base?a.b=1");

        let smuggled = generate_cache_key("base", &object(json!({"a": "1&b=2"})));
        let split = generate_cache_key("base", &object(json!({"a": 1, "b": 2})));
        assert_ne!(smuggled, split);
        assert_eq!(smuggled, "base?a=1%26b%3D2");
    }

    #[test]
    fn test_query_pairs_are_not_escaped() {
        let pairs = query_pairs(&json!({"q": "a&b"})).unwrap();
        assert_eq!(pairs, vec![("q".to_string(), "a&b".to_string())]);
    }

    #[test]
    fn test_only_null_params_returns_base() {
        let key = generate_cache_key("host:analytics", &object(json!({"hotelId": null})));
        assert_eq!(key, "host:analytics");
    }

    #[test]
    fn test_cache_key_for_struct() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Filters {
            hotel_id: u64,
            status: Option<String>,
        }

        let key = cache_key_for(
            "host:bookings",
            &Filters {
                hotel_id: 7,
                status: None,
            },
        )
        .unwrap();
        assert_eq!(key, "host:bookings?hotelId=7");
    }

    #[test]
    fn test_query_pairs_match_key_rendering() {
        let pairs = query_pairs(&json!({"stars": [3, 4], "city": "Hue", "page": null})).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("city".to_string(), "Hue".to_string()),
                ("stars".to_string(), "3,4".to_string()),
            ]
        );
        assert!(query_pairs(&()).unwrap().is_empty());
    }

    #[test]
    fn test_cache_key_for_rejects_scalars() {
        assert!(cache_key_for("base", &42).is_err());
    }
}
