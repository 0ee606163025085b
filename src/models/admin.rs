use serde::Deserialize;

use super::ride::{RequestStatus, RideId, UserId};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDriver {
    pub id: UserId,
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub license_number: Option<String>,
}

/// A passenger's request on one of the signed-in driver's rides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRideRequest {
    #[serde(default, alias = "id")]
    pub request_id: Option<i64>,
    pub ride_id: RideId,
    #[serde(default)]
    pub passenger_id: Option<UserId>,
    #[serde(default)]
    pub passenger_name: String,
    pub status: RequestStatus,
}
