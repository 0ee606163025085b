use std::{collections::HashMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::shared::{geo::Coordinate, time};

pub type RideId = i64;
pub type UserId = i64;

/// Lookup of the signed-in user's request status per ride.
pub type RequestMap = HashMap<RideId, RequestStatus>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: RideId,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: String,
    #[serde(default)]
    pub car_model: String,
    #[serde(default)]
    pub car_plate: String,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub start_lat: f64,
    pub start_lon: f64,
    pub fare: f64,
    pub available_seats: u32,
    #[serde(alias = "startTime")]
    pub departure_time: String,
    #[serde(default)]
    pub pickup_comment: Option<String>,
}

impl Ride {
    pub fn start(&self) -> Coordinate {
        Coordinate::from((self.start_lat, self.start_lon))
    }

    pub fn departs_at(&self) -> Option<DateTime<Utc>> {
        time::parse_departure(&self.departure_time)
    }

    /// A ride whose departure cannot be read is treated as already gone.
    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.departs_at().is_none_or(|departure| departure <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    /// Pending and accepted requests still hold a claim on the ride and can be cancelled.
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Accepted),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        };
        f.write_str(value)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" | "approved" => Ok(Self::Accepted),
            "rejected" | "declined" => Ok(Self::Rejected),
            _ => Err(format!("unknown request status `{value}`")),
        }
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    /// The backend sends either the status name or its numeric code.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Code(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
            Raw::Code(code) => Self::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown request status {code}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    #[serde(default, alias = "id")]
    pub request_id: Option<i64>,
    pub ride_id: RideId,
    pub status: RequestStatus,
}

/// Builds the lookup, preferring an active request when a ride has several.
pub fn requests_by_ride(requests: impl IntoIterator<Item = RideRequest>) -> RequestMap {
    let mut map = RequestMap::new();
    for request in requests {
        map.entry(request.ride_id)
            .and_modify(|status| {
                if !status.is_active() {
                    *status = request.status;
                }
            })
            .or_insert(request.status);
    }
    map
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRideRequest {
    pub ride_id: RideId,
    pub user_id: UserId,
}

/// A ride offer validated on the client, ready to be posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub start_address: String,
    pub end_address: String,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    pub departure_time: String,
    pub available_seats: u32,
    pub fare: f64,
    pub car_model: String,
    pub car_plate: String,
    pub driver_phone: String,
    pub pickup_comment: Option<String>,
    pub driver_id: Option<UserId>,
}

#[test]
fn status_from_name_or_code() {
    let from_name: RequestStatus = serde_json::from_str("\"pending\"").unwrap();
    let from_code: RequestStatus = serde_json::from_str("1").unwrap();
    assert_eq!(from_name, RequestStatus::Pending);
    assert_eq!(from_code, RequestStatus::Accepted);
    assert!(serde_json::from_str::<RequestStatus>("7").is_err());
    assert!(serde_json::from_str::<RequestStatus>("\"lost\"").is_err());
}

#[test]
fn active_request_wins() {
    let map = requests_by_ride([
        RideRequest {
            request_id: Some(1),
            ride_id: 10,
            status: RequestStatus::Rejected,
        },
        RideRequest {
            request_id: Some(2),
            ride_id: 10,
            status: RequestStatus::Pending,
        },
        RideRequest {
            request_id: Some(3),
            ride_id: 10,
            status: RequestStatus::Rejected,
        },
    ]);
    assert_eq!(map.get(&10), Some(&RequestStatus::Pending));
}

#[test]
fn ride_from_backend_json() {
    let ride: Ride = serde_json::from_str(
        r#"{
            "id": 4,
            "driverName": "Rami",
            "startAddress": "Hamra",
            "endAddress": "Jounieh",
            "startLat": 33.8966,
            "startLon": 35.4823,
            "fare": 3.5,
            "availableSeats": 2,
            "departureTime": "2030-01-01T08:00:00Z"
        }"#,
    )
    .unwrap();
    assert_eq!(ride.driver_name, "Rami");
    assert_eq!(ride.pickup_comment, None);
    assert!(!ride.has_departed(Utc::now()));
}
