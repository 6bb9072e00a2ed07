//! Restaurant catalog entry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::id::RestaurantId;

/// A restaurant as returned by the catalog endpoints.
///
/// Sourced verbatim from the backend and never mutated locally. Known fields
/// are read leniently: numbers may arrive as strings, and a value that does
/// not fit its field stays in `extra` instead of failing the entry. Fields
/// the client does not interpret are kept in `extra` as well, so nothing is
/// lost when a listing is re-serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RestaurantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Location label. Read from `city`, or from `place` when `city` is
    /// missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Restaurant {
    /// Display name, empty when the backend omitted it.
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Build an entry from a backend JSON object.
    #[must_use]
    pub fn from_object(mut map: Map<String, Value>) -> Self {
        let id = take(&mut map, "id", RestaurantId::from_json);
        let name = take(&mut map, "name", as_text);
        let rating = take(&mut map, "rating", as_number);
        let city = take(&mut map, "city", as_text).or_else(|| take(&mut map, "place", as_text));
        let distance_km = take(&mut map, "distanceKm", as_number);
        let price = take(&mut map, "price", as_number);

        Self {
            id,
            name,
            rating,
            city,
            distance_km,
            price,
            extra: map,
        }
    }
}

impl<'de> Deserialize<'de> for Restaurant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_object)
    }
}

/// Remove `key` when it is null or parses; otherwise leave it in place.
fn take<T>(map: &mut Map<String, Value>, key: &str, parse: fn(&Value) -> Option<T>) -> Option<T> {
    let parsed = match map.get(key)? {
        Value::Null => None,
        value => Some(parse(value)?),
    };
    map.remove(key);
    parsed
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let resto: Restaurant = serde_json::from_value(json!({
            "id": 1,
            "name": "Warung A",
            "rating": 4.5,
            "city": "Jakarta",
            "distanceKm": 1.2,
            "logo": "https://cdn.example.com/a.png"
        }))
        .unwrap();

        assert_eq!(resto.id, Some(RestaurantId::Number(1)));
        assert_eq!(resto.distance_km, Some(1.2));
        assert_eq!(resto.extra["logo"], "https://cdn.example.com/a.png");
        assert_eq!(resto.extra.len(), 1);
    }

    #[test]
    fn test_deserialize_sparse_entry() {
        let resto: Restaurant = serde_json::from_str("{}").unwrap();
        assert_eq!(resto.name_or_empty(), "");
        assert!(resto.id.is_none());
    }

    #[test]
    fn test_numbers_sent_as_strings() {
        let resto: Restaurant =
            serde_json::from_value(json!({"id": 1.0, "rating": "4.7", "price": " 25000 "})).unwrap();

        assert_eq!(resto.id, Some(RestaurantId::Number(1)));
        assert_eq!(resto.rating, Some(4.7));
        assert_eq!(resto.price, Some(25_000.0));
    }

    #[test]
    fn test_unreadable_values_stay_in_extra() {
        let resto: Restaurant = serde_json::from_value(json!({
            "name": "Bakso B",
            "rating": "great",
            "price": {"min": 10},
            "distanceKm": null
        }))
        .unwrap();

        assert_eq!(resto.rating, None);
        assert_eq!(resto.extra["rating"], "great");
        assert_eq!(resto.extra["price"], json!({"min": 10}));
        assert!(!resto.extra.contains_key("distanceKm"));

        let back = serde_json::to_value(&resto).unwrap();
        assert_eq!(back, json!({"name": "Bakso B", "rating": "great", "price": {"min": 10}}));
    }

    #[test]
    fn test_city_wins_over_place() {
        let both: Restaurant =
            serde_json::from_value(json!({"city": "Jakarta", "place": "Mall Kota"})).unwrap();
        assert_eq!(both.city.as_deref(), Some("Jakarta"));
        assert_eq!(both.extra["place"], "Mall Kota");

        let place_only: Restaurant = serde_json::from_value(json!({"place": "Bandung"})).unwrap();
        assert_eq!(place_only.city.as_deref(), Some("Bandung"));
        assert!(place_only.extra.is_empty());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_value::<Restaurant>(json!("Warung A")).is_err());
    }
}
