use crate::models::lenient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bus_number: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub bus_name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub bus_type: String,
    #[serde(default)]
    pub route: RawRoute,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub from: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<Value>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub timings: Vec<BusTiming>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields the admin UI stored that the service does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Bus {
    /// Identity used to de-duplicate search results: the document id when
    /// present, otherwise the serialized record.
    pub fn identity(&self) -> String {
        match &self.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

/// The shapes a stored `route` field shows up in. Resolved into a plain list
/// of stop names by `search::route::extract_route` and never inspected
/// anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRoute {
    Stops(Vec<RouteEntry>),
    Delimited(String),
    Unrecognized(Value),
}

impl Default for RawRoute {
    fn default() -> Self {
        RawRoute::Stops(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteEntry {
    Name(String),
    Stop(Map<String, Value>),
    Other(Value),
}

impl RouteEntry {
    /// Stop name carried by this entry, or an empty string when it has none.
    pub fn stop_name(&self) -> String {
        match self {
            RouteEntry::Name(name) => name.clone(),
            RouteEntry::Stop(fields) => ["name", "stopName", "stop"]
                .iter()
                .filter_map(|key| fields.get(*key))
                .map(value_to_text)
                .find(|name| !name.trim().is_empty())
                .unwrap_or_default(),
            RouteEntry::Other(value) => value_to_text(value),
        }
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusTiming {
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub stop_name: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub arrival_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub departure_time: Option<String>,
    /// Legacy records carry a single time for both arrival and departure.
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    #[serde(rename = "KSRTC")]
    Ksrtc,
    Private,
    Fast,
    #[serde(rename = "Super Fast")]
    SuperFast,
    Ordinary,
}

impl BusType {
    pub const ALL: [BusType; 5] = [
        BusType::Ksrtc,
        BusType::Private,
        BusType::Fast,
        BusType::SuperFast,
        BusType::Ordinary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BusType::Ksrtc => "KSRTC",
            BusType::Private => "Private",
            BusType::Fast => "Fast",
            BusType::SuperFast => "Super Fast",
            BusType::Ordinary => "Ordinary",
        }
    }

    /// Fare per kilometre in rupees.
    pub fn rate_per_km(self) -> f64 {
        match self {
            BusType::Ksrtc => 1.2,
            BusType::Private => 1.5,
            BusType::Fast => 1.8,
            BusType::SuperFast => 2.2,
            BusType::Ordinary => 1.0,
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BusType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown bus type '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_every_route_shape() {
        let list: Bus = serde_json::from_value(json!({ "route": ["Pala", "Kottayam"] })).unwrap();
        assert_eq!(
            list.route,
            RawRoute::Stops(vec![
                RouteEntry::Name("Pala".into()),
                RouteEntry::Name("Kottayam".into())
            ])
        );

        let objects: Bus =
            serde_json::from_value(json!({ "route": [{ "stopName": "Pala" }, 7] })).unwrap();
        match &objects.route {
            RawRoute::Stops(entries) => {
                assert_eq!(entries[0].stop_name(), "Pala");
                assert_eq!(entries[1].stop_name(), "7");
            }
            other => panic!("unexpected route {:?}", other),
        }

        let delimited: Bus = serde_json::from_value(json!({ "route": "Pala-Kottayam" })).unwrap();
        assert_eq!(delimited.route, RawRoute::Delimited("Pala-Kottayam".into()));

        let missing: Bus = serde_json::from_value(json!({ "busName": "x" })).unwrap();
        assert_eq!(missing.route, RawRoute::default());
    }

    #[test]
    fn keeps_unknown_fields_and_type_rename() {
        let bus: Bus = serde_json::from_value(json!({
            "id": "b1",
            "type": "Super Fast",
            "operator": "KSRTC depot 4"
        }))
        .unwrap();
        assert_eq!(bus.bus_type.parse::<BusType>(), Ok(BusType::SuperFast));
        assert_eq!(bus.extra.get("operator"), Some(&json!("KSRTC depot 4")));

        let back = serde_json::to_value(&bus).unwrap();
        assert_eq!(back["type"], json!("Super Fast"));
        assert_eq!(back["operator"], json!("KSRTC depot 4"));
    }

    #[test]
    fn stop_object_without_name_fields_is_empty() {
        let entry: RouteEntry = serde_json::from_value(json!({ "lat": 9.5 })).unwrap();
        assert_eq!(entry.stop_name(), "");
    }

    #[test]
    fn blank_name_fields_fall_through_to_the_next_key() {
        let entry: RouteEntry =
            serde_json::from_value(json!({ "name": null, "stopName": "", "stop": "Pala" })).unwrap();
        assert_eq!(entry.stop_name(), "Pala");

        let entry: RouteEntry =
            serde_json::from_value(json!({ "name": "  ", "stopName": "Kottayam" })).unwrap();
        assert_eq!(entry.stop_name(), "Kottayam");
    }

    #[test]
    fn tolerates_nulls_and_wrong_scalar_types() {
        let bus: Bus = serde_json::from_value(json!({
            "id": 42,
            "busNumber": 1234,
            "busName": null,
            "type": "Fast",
            "route": ["Pala", "Kottayam"],
            "timings": [
                { "stopName": "Pala", "arrivalTime": 800, "departureTime": null },
                "not a timing",
                { "stopName": "Kottayam", "dayOfWeek": "daily" }
            ],
            "createdAt": { "seconds": 1714550000 }
        }))
        .unwrap();

        assert_eq!(bus.id.as_deref(), Some("42"));
        assert_eq!(bus.bus_number, "1234");
        assert_eq!(bus.bus_name, "");
        assert_eq!(bus.timings.len(), 2);
        assert_eq!(bus.timings[0].arrival_time.as_deref(), Some("800"));
        assert_eq!(bus.timings[0].departure_time, None);
        assert!(bus.created_at.is_none());

        let no_timings: Bus = serde_json::from_value(json!({ "timings": null })).unwrap();
        assert!(no_timings.timings.is_empty());
    }

    #[test]
    fn identity_falls_back_to_serialized_record() {
        let mut bus: Bus = serde_json::from_value(json!({ "busName": "Coastal" })).unwrap();
        assert!(bus.identity().contains("Coastal"));
        bus.id = Some("abc".into());
        assert_eq!(bus.identity(), "abc");
    }
}
