use chrono::{DateTime, Utc};

use super::action::RideAction;
use crate::{
    models::{RequestMap, RequestStatus, Ride, RideId},
    shared::geo::{Coordinate, Distance},
};

/// Everything the rides view renders from.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    rides: Vec<Ride>,
    requests: RequestMap,
    coordinates: Option<Coordinate>,
    last_fetched: Option<DateTime<Utc>>,
    error: Option<String>,
    now: DateTime<Utc>,
    loading: bool,
    busy_ride: Option<RideId>,
    fetch_seq: u64,
}

/// A ride with its derived action and distance from the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RideView {
    pub ride: Ride,
    pub status: Option<RequestStatus>,
    pub action: RideAction,
    pub distance: Option<Distance>,
}

impl DiscoveryState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            ..Default::default()
        }
    }

    pub fn rides(&self) -> &[Ride] {
        &self.rides
    }

    pub fn ride(&self, id: RideId) -> Option<&Ride> {
        self.rides.iter().find(|ride| ride.id == id)
    }

    pub fn requests(&self) -> &RequestMap {
        &self.requests
    }

    pub fn status_of(&self, id: RideId) -> Option<RequestStatus> {
        self.requests.get(&id).copied()
    }

    pub fn coordinates(&self) -> Option<Coordinate> {
        self.coordinates
    }

    pub fn last_fetched(&self) -> Option<DateTime<Utc>> {
        self.last_fetched
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn busy_ride(&self) -> Option<RideId> {
        self.busy_ride
    }

    pub fn action_for(&self, ride: &Ride) -> RideAction {
        RideAction::evaluate(self.now, ride, self.status_of(ride.id))
    }

    /// Rides in display order, nearest first when the user's position is known.
    pub fn listing(&self) -> Vec<RideView> {
        let mut views: Vec<RideView> = self
            .rides
            .iter()
            .map(|ride| RideView {
                ride: ride.clone(),
                status: self.status_of(ride.id),
                action: self.action_for(ride),
                distance: self.coordinates.map(|at| at.distance(&ride.start())),
            })
            .collect();
        views.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        views
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    /// A new position invalidates any fetch still in flight for the old one.
    pub fn set_coordinates(&mut self, coordinates: Option<Coordinate>) {
        if self.coordinates != coordinates {
            self.fetch_seq += 1;
            self.loading = false;
        }
        self.coordinates = coordinates;
        if coordinates.is_none() {
            self.rides.clear();
            self.last_fetched = None;
        }
    }

    /// Starts a ride fetch and returns its ticket. Only the latest ticket may
    /// apply its result or end the loading state.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_seq += 1;
        self.loading = true;
        self.fetch_seq
    }

    /// Whether `ticket` is still the newest fetch. Ends the loading state if so.
    pub fn finish_fetch(&mut self, ticket: u64) -> bool {
        if ticket != self.fetch_seq {
            return false;
        }
        self.loading = false;
        true
    }

    pub fn set_busy_ride(&mut self, ride: Option<RideId>) {
        self.busy_ride = ride;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replaces the whole working set. Nothing from the previous fetch survives.
    pub fn replace_rides(&mut self, rides: Vec<Ride>, fetched_at: DateTime<Utc>) {
        self.rides = rides;
        self.last_fetched = Some(fetched_at);
        self.error = None;
    }

    pub fn fail_fetch(&mut self, message: impl Into<String>) {
        self.rides.clear();
        self.error = Some(message.into());
    }

    pub fn replace_requests(&mut self, requests: RequestMap) {
        self.requests = requests;
    }

    /// Drops the request and gives the seat back until the next fetch says otherwise.
    pub fn apply_cancel(&mut self, id: RideId) {
        self.requests.remove(&id);
        if let Some(ride) = self.rides.iter_mut().find(|ride| ride.id == id) {
            ride.available_seats = ride.available_seats.saturating_add(1);
        }
    }
}

#[test]
fn only_latest_fetch_finishes_test() {
    let mut state = DiscoveryState::new(Utc::now());
    let older = state.begin_fetch();
    let newer = state.begin_fetch();
    assert!(state.finish_fetch(newer));
    assert!(!state.is_loading());
    assert!(!state.finish_fetch(older));

    let moved = state.begin_fetch();
    state.set_coordinates(Some(Coordinate::from((33.9, 35.5))));
    assert!(!state.is_loading());
    assert!(!state.finish_fetch(moved));
}
