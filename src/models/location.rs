use serde::{Deserialize, Deserializer};

use crate::shared::geo::Coordinate;

/// One autocomplete hit. Discarded once the user picks or moves on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationSuggestion {
    #[serde(deserialize_with = "lenient_string")]
    pub place_id: String,
    pub display_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
}

impl LocationSuggestion {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from((self.lat, self.lon))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReverseResult {
    pub display_name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Text(String),
    Number(f64),
}

// Geocoding providers send coordinates and ids as strings.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Lenient::deserialize(deserializer)? {
        Lenient::Number(value) => Ok(value),
        Lenient::Text(value) => value.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Lenient::deserialize(deserializer)? {
        Lenient::Number(value) => Ok(format!("{value}")),
        Lenient::Text(value) => Ok(value),
    }
}

#[test]
fn suggestion_with_string_coordinates() {
    let suggestion: LocationSuggestion = serde_json::from_str(
        r#"{"place_id":"3214","display_name":"Hamra, Beirut","lat":"33.8966","lon":"35.4823"}"#,
    )
    .unwrap();
    assert_eq!(suggestion.coordinate(), Coordinate::from((33.8966, 35.4823)));
}

#[test]
fn suggestion_with_numeric_fields() {
    let suggestion: LocationSuggestion = serde_json::from_str(
        r#"{"place_id":3214,"display_name":"Hamra, Beirut","lat":33.8966,"lon":35.4823}"#,
    )
    .unwrap();
    assert_eq!(suggestion.place_id, "3214");
}
