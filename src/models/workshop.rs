use serde::Serialize;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde_json::Value;

/// Workshop fields printed on a ticket.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct WorkshopMeta {
    pub workshop_name: String,
    pub geolocation: String,
}

impl WorkshopMeta {
    /// Reads `djCrud/get_workshop_by_id` output. The name may live under
    /// `name` or `workshopName`; geolocation is a string or a lat/lng object.
    pub fn from_value(meta: &Value) -> Self {
        let workshop_name = meta
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                meta.get("workshopName")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or("Workshop")
            .to_string();

        let geolocation = match meta.get("geolocation") {
            Some(Value::String(s)) => s.clone(),
            Some(geo) => match (geo.get("latitude"), geo.get("longitude")) {
                (Some(lat), Some(lng)) if !lat.is_null() && !lng.is_null() => {
                    format!("{},{}", plain(lat), plain(lng))
                }
                _ => String::new(),
            },
            None => String::new(),
        };

        WorkshopMeta {
            workshop_name,
            geolocation,
        }
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_are_joined() {
        let meta = WorkshopMeta::from_value(&json!({
            "workshopName": "Kathak Basics",
            "geolocation": { "latitude": 12.97, "longitude": 77.59 },
        }));
        assert_eq!(meta.workshop_name, "Kathak Basics");
        assert_eq!(meta.geolocation, "12.97,77.59");
    }

    #[test]
    fn missing_fields_fall_back() {
        let meta = WorkshopMeta::from_value(&json!({}));
        assert_eq!(meta.workshop_name, "Workshop");
        assert_eq!(meta.geolocation, "");
    }

    #[test]
    fn string_geolocation_is_kept() {
        let meta = WorkshopMeta::from_value(&json!({ "name": "Salsa", "geolocation": "12,77" }));
        assert_eq!(meta.workshop_name, "Salsa");
        assert_eq!(meta.geolocation, "12,77");
    }
}
