use chrono::{DateTime, Utc};

use crate::models::{RequestStatus, Ride};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// Departure time has passed. Never requestable again.
    Started,
    /// No seats left.
    Full,
}

/// What the user can do with a ride right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideAction {
    Requestable,
    RequestPending,
    NotAvailable(Unavailable),
}

impl RideAction {
    /// Depends only on the clock, the departure time, the user's request
    /// status and the seat count.
    pub fn evaluate(now: DateTime<Utc>, ride: &Ride, status: Option<RequestStatus>) -> Self {
        if ride.has_departed(now) {
            Self::NotAvailable(Unavailable::Started)
        } else if status.is_some_and(|status| status.is_active()) {
            Self::RequestPending
        } else if ride.available_seats > 0 {
            Self::Requestable
        } else {
            Self::NotAvailable(Unavailable::Full)
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Requestable => "Request Ride",
            Self::RequestPending => "Cancel",
            Self::NotAvailable(Unavailable::Started) => "Ride Started",
            Self::NotAvailable(Unavailable::Full) => "Not Available",
        }
    }

    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::NotAvailable(_))
    }
}
