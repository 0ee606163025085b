use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ride::{RideId, UserId};

/// Local identifier of a stored account, distinct from the backend user id.
pub type AccountId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Passenger,
    Driver,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Passenger => "passenger",
            Self::Driver => "driver",
            Self::Admin => "admin",
        };
        f.write_str(value)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "passenger" | "" => Ok(Self::Passenger),
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("unknown role `{value}`")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    pub license_number: String,
    pub car_plate: String,
    pub car_model: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Requested,
    Cancelled,
    Posted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub ride_id: Option<RideId>,
    pub from: String,
    pub to: String,
    pub fare: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub driver_info: Option<DriverInfo>,
    #[serde(default)]
    pub ride_history: Vec<HistoryEntry>,
}

/// Everything needed to store an account except its local id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub user_id: Option<UserId>,
    pub token: Option<String>,
    pub driver_info: Option<DriverInfo>,
}

impl Account {
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub full_name: String,
    pub driver_info: Option<DriverInfo>,
}
