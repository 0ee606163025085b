//! Nearby ride discovery: the ride list, the user's requests on those rides,
//! and the timers that keep both fresh.

use std::{future::Future, time::Duration};
use thiserror::Error;

use crate::{
    api::{self, ApiClient},
    config::Config,
    models::{Ride, RideId, RideRequest, UserId},
    shared::geo::{Coordinate, Distance},
};

mod action;
mod poller;
mod state;

pub use action::*;
pub use poller::*;
pub use state::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("This ride has already started")]
    Departed,
    #[error("You already have a request on this ride")]
    AlreadyRequested,
    #[error("No seats left on this ride")]
    Full,
    #[error("You have no request on this ride")]
    NotRequested,
    #[error("Ride {0} is not in the current list")]
    UnknownRide(RideId),
    #[error("Cancellation aborted")]
    Declined,
    #[error("Please sign in first")]
    NotSignedIn,
    #[error("Location is not set")]
    NoLocation,
    #[error(transparent)]
    Api(#[from] api::Error),
}

/// The backend calls the poller depends on.
pub trait RideBackend: Send + Sync + 'static {
    fn nearby_rides(
        &self,
        near: Coordinate,
        radius: Distance,
    ) -> impl Future<Output = Result<Vec<Ride>, api::Error>> + Send;

    fn user_requests(
        &self,
        passenger_id: UserId,
    ) -> impl Future<Output = Result<Vec<RideRequest>, api::Error>> + Send;

    fn request_ride(
        &self,
        ride_id: RideId,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), api::Error>> + Send;

    fn cancel_request(
        &self,
        ride_id: RideId,
        user_id: UserId,
    ) -> impl Future<Output = Result<(), api::Error>> + Send;
}

impl RideBackend for ApiClient {
    async fn nearby_rides(
        &self,
        near: Coordinate,
        radius: Distance,
    ) -> Result<Vec<Ride>, api::Error> {
        ApiClient::nearby_rides(self, near, radius).await
    }

    async fn user_requests(&self, passenger_id: UserId) -> Result<Vec<RideRequest>, api::Error> {
        ApiClient::user_requests(self, passenger_id).await
    }

    async fn request_ride(&self, ride_id: RideId, user_id: UserId) -> Result<(), api::Error> {
        ApiClient::request_ride(self, ride_id, user_id).await
    }

    async fn cancel_request(&self, ride_id: RideId, user_id: UserId) -> Result<(), api::Error> {
        ApiClient::cancel_request(self, ride_id, user_id).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub radius: Distance,
    pub refresh_interval: Duration,
    pub clock_interval: Duration,
    pub reconcile_delay: Duration,
}

impl From<&Config> for PollSettings {
    fn from(config: &Config) -> Self {
        Self {
            radius: config.search_radius,
            refresh_interval: config.refresh_interval,
            clock_interval: config.clock_interval,
            reconcile_delay: config.reconcile_delay,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}
