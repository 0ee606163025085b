use reqwest::Method;
use tracing::info;

use super::{ApiClient, Error};
use crate::{
    models::{DriverRideRequest, NewRide, NewRideRequest, Ride, RideId, RideRequest, UserId},
    shared::geo::{Coordinate, Distance},
};

impl ApiClient {
    pub async fn nearby_rides(
        &self,
        near: Coordinate,
        radius: Distance,
    ) -> Result<Vec<Ride>, Error> {
        let url = self.url(
            "/api/rides",
            &[
                ("nearLat", near.latitude.to_string()),
                ("nearLon", near.longitude.to_string()),
                ("radius", radius.as_kilometers().to_string()),
            ],
        )?;
        let rides: Vec<Ride> = self.get(url).await?;
        info!("Fetched {} rides within {radius} of {near}", rides.len());
        Ok(rides)
    }

    pub async fn request_ride(&self, ride_id: RideId, user_id: UserId) -> Result<(), Error> {
        let url = self.url("/api/Pooling/request", &[])?;
        let payload = NewRideRequest { ride_id, user_id };
        self.send_json(Method::POST, url, &payload).await?;
        info!("Requested ride {ride_id}");
        Ok(())
    }

    pub async fn cancel_request(&self, ride_id: RideId, user_id: UserId) -> Result<(), Error> {
        let url = self.url(
            "/api/Pooling/cancel",
            &[
                ("rideId", ride_id.to_string()),
                ("userId", user_id.to_string()),
            ],
        )?;
        self.send(self.request(Method::DELETE, url)).await?;
        info!("Cancelled request on ride {ride_id}");
        Ok(())
    }

    pub async fn user_requests(&self, passenger_id: UserId) -> Result<Vec<RideRequest>, Error> {
        let url = self.url(
            "/api/Pooling/userrequests",
            &[("passengerId", passenger_id.to_string())],
        )?;
        self.get(url).await
    }

    pub async fn driver_requests(&self, driver_id: UserId) -> Result<Vec<DriverRideRequest>, Error> {
        let url = self.url(
            "/api/Pooling/driverrequests",
            &[("driverId", driver_id.to_string())],
        )?;
        self.get(url).await
    }

    pub async fn post_ride(&self, ride: &NewRide) -> Result<(), Error> {
        let url = self.url("/api/rides", &[])?;
        self.send_json(Method::POST, url, ride).await?;
        info!(
            "Posted ride from {} to {}",
            ride.start_address, ride.end_address
        );
        Ok(())
    }
}
