use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Utc};
use poolify::{
    api,
    discovery::{Error, PollSettings, Poller, RideAction, RideBackend, Unavailable},
    models::{RequestStatus, Ride, RideId, RideRequest, UserId},
    shared::{Coordinate, Distance, FixedAnswer, time},
};
use reqwest::StatusCode;

const USER: UserId = 42;

#[derive(Default)]
struct Backend {
    rides: Mutex<Vec<Ride>>,
    fail_rides: Mutex<Option<String>>,
    first_fetch_delay: Mutex<Option<Duration>>,
    fail_actions: Mutex<Option<(StatusCode, String)>>,
    requests: Mutex<Vec<RideRequest>>,
    nearby_calls: Mutex<Vec<Coordinate>>,
    request_calls: Mutex<Vec<RideId>>,
    cancel_calls: Mutex<Vec<RideId>>,
}

#[derive(Clone, Default)]
struct MockBackend(Arc<Backend>);

impl MockBackend {
    fn set_rides(&self, rides: Vec<Ride>) {
        *self.0.rides.lock().unwrap() = rides;
    }

    fn fail_rides(&self, message: &str) {
        *self.0.fail_rides.lock().unwrap() = Some(message.to_string());
    }

    fn delay_next_fetch(&self, delay: Duration) {
        *self.0.first_fetch_delay.lock().unwrap() = Some(delay);
    }

    fn fail_actions(&self, status: StatusCode, message: &str) {
        *self.0.fail_actions.lock().unwrap() = Some((status, message.to_string()));
    }

    fn action_failure(&self) -> Result<(), api::Error> {
        match self.0.fail_actions.lock().unwrap().clone() {
            Some((status, message)) => Err(api::Error::Status { status, message }),
            None => Ok(()),
        }
    }

    fn set_requests(&self, requests: Vec<RideRequest>) {
        *self.0.requests.lock().unwrap() = requests;
    }

    fn nearby_calls(&self) -> usize {
        self.0.nearby_calls.lock().unwrap().len()
    }
}

impl RideBackend for MockBackend {
    async fn nearby_rides(
        &self,
        near: Coordinate,
        _: Distance,
    ) -> Result<Vec<Ride>, api::Error> {
        self.0.nearby_calls.lock().unwrap().push(near);
        if let Some(message) = self.0.fail_rides.lock().unwrap().clone() {
            return Err(api::Error::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message,
            });
        }
        let rides = self.0.rides.lock().unwrap().clone();
        let delay = self.0.first_fetch_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(rides)
    }

    async fn user_requests(&self, _: UserId) -> Result<Vec<RideRequest>, api::Error> {
        Ok(self.0.requests.lock().unwrap().clone())
    }

    async fn request_ride(&self, ride_id: RideId, _: UserId) -> Result<(), api::Error> {
        self.0.request_calls.lock().unwrap().push(ride_id);
        self.action_failure()?;
        self.0.requests.lock().unwrap().push(pending(ride_id));
        Ok(())
    }

    async fn cancel_request(&self, ride_id: RideId, _: UserId) -> Result<(), api::Error> {
        self.0.cancel_calls.lock().unwrap().push(ride_id);
        self.action_failure()?;
        self.0
            .requests
            .lock()
            .unwrap()
            .retain(|request| request.ride_id != ride_id);
        Ok(())
    }
}

fn ride(id: RideId, seats: u32) -> Ride {
    Ride {
        id,
        driver_name: format!("Driver {id}"),
        driver_phone: String::new(),
        car_model: "Yaris".into(),
        car_plate: format!("P{id}"),
        start_address: "Hamra".into(),
        end_address: "Byblos".into(),
        start_lat: 33.8966 + id as f64 * 0.001,
        start_lon: 35.4823,
        fare: 4.0,
        available_seats: seats,
        departure_time: time::format_wire(&(Utc::now() + chrono::Duration::hours(3))),
        pickup_comment: None,
    }
}

fn pending(ride_id: RideId) -> RideRequest {
    RideRequest {
        request_id: None,
        ride_id,
        status: RequestStatus::Pending,
    }
}

fn settings() -> PollSettings {
    PollSettings {
        radius: Distance::from_kilometers(5.0),
        refresh_interval: Duration::from_secs(120),
        clock_interval: Duration::from_secs(60),
        reconcile_delay: Duration::from_secs(1),
    }
}

fn here() -> Coordinate {
    Coordinate::from((33.8938, 35.5018))
}

fn ids(rides: &[Ride]) -> Vec<RideId> {
    rides.iter().map(|ride| ride.id).collect()
}

#[tokio::test]
async fn fetch_replaces_whole_list_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2), ride(2, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));

    poller.fetch_nearby_rides(here()).await.unwrap();
    assert_eq!(ids(poller.snapshot().await.rides()), [1, 2]);

    backend.set_rides(vec![ride(3, 1)]);
    poller.refresh().await.unwrap();
    let state = poller.snapshot().await;
    assert_eq!(ids(state.rides()), [3]);
    assert!(state.last_fetched().is_some());
}

#[tokio::test]
async fn empty_result_clears_list_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(here()).await.unwrap();

    backend.set_rides(Vec::new());
    poller.refresh().await.unwrap();
    let state = poller.snapshot().await;
    assert!(state.rides().is_empty());
    assert_eq!(state.error(), None);
}

#[tokio::test]
async fn failed_fetch_clears_list_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(here()).await.unwrap();

    backend.fail_rides("Database unavailable");
    let result = poller.refresh().await;
    assert!(matches!(result, Err(Error::Api(_))));
    let state = poller.snapshot().await;
    assert!(state.rides().is_empty());
    assert_eq!(state.error(), Some("Database unavailable"));
    assert!(!state.is_loading());
}

#[tokio::test]
async fn no_location_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));

    poller.set_coordinates(None).await.unwrap();
    assert!(matches!(poller.refresh().await, Err(Error::NoLocation)));
    assert_eq!(backend.nearby_calls(), 0);
    let state = poller.snapshot().await;
    assert!(state.rides().is_empty());
    assert_eq!(state.error(), Some("Location is not set"));
}

#[tokio::test]
async fn request_guards_test() {
    let backend = MockBackend::default();
    let mut gone = ride(3, 2);
    gone.departure_time = time::format_wire(&(Utc::now() - chrono::Duration::minutes(1)));
    backend.set_rides(vec![ride(1, 0), ride(2, 2), gone]);
    backend.set_requests(vec![pending(2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_user_requested_rides().await.unwrap();
    poller.fetch_nearby_rides(here()).await.unwrap();

    assert!(matches!(poller.request_ride(1).await, Err(Error::Full)));
    assert!(matches!(
        poller.request_ride(2).await,
        Err(Error::AlreadyRequested)
    ));
    assert!(matches!(poller.request_ride(3).await, Err(Error::Departed)));
    assert!(matches!(
        poller.request_ride(9).await,
        Err(Error::UnknownRide(9))
    ));
    assert!(backend.0.request_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn guest_cannot_request_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), None);
    poller.fetch_nearby_rides(here()).await.unwrap();
    assert!(matches!(
        poller.request_ride(1).await,
        Err(Error::NotSignedIn)
    ));
}

#[tokio::test]
async fn request_resyncs_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(here()).await.unwrap();

    poller.request_ride(1).await.unwrap();
    let state = poller.snapshot().await;
    assert_eq!(state.status_of(1), Some(RequestStatus::Pending));
    assert_eq!(state.action_for(&state.rides()[0]), RideAction::RequestPending);
    assert_eq!(state.busy_ride(), None);
    assert_eq!(backend.nearby_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_gives_seat_back_until_reconcile_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    backend.set_requests(vec![pending(1)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_user_requested_rides().await.unwrap();
    poller.fetch_nearby_rides(here()).await.unwrap();

    poller.cancel_ride(1, &FixedAnswer(true)).await.unwrap();
    let state = poller.snapshot().await;
    assert_eq!(state.rides()[0].available_seats, 3);
    assert_eq!(state.status_of(1), None);
    assert_eq!(state.action_for(&state.rides()[0]), RideAction::Requestable);
    assert_eq!(*backend.0.cancel_calls.lock().unwrap(), [1]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let state = poller.snapshot().await;
    assert_eq!(state.rides()[0].available_seats, 2);
    assert_eq!(backend.nearby_calls(), 2);
}

#[tokio::test]
async fn declined_cancel_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    backend.set_requests(vec![pending(1)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_user_requested_rides().await.unwrap();
    poller.fetch_nearby_rides(here()).await.unwrap();

    let result = poller.cancel_ride(1, &FixedAnswer(false)).await;
    assert!(matches!(result, Err(Error::Declined)));
    let state = poller.snapshot().await;
    assert_eq!(state.rides()[0].available_seats, 2);
    assert_eq!(state.status_of(1), Some(RequestStatus::Pending));
    assert!(backend.0.cancel_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancel_without_request_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(here()).await.unwrap();

    let result = poller.cancel_ride(1, &FixedAnswer(true)).await;
    assert!(matches!(result, Err(Error::NotRequested)));
}

#[tokio::test(start_paused = true)]
async fn passive_refresh_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.start().await;
    poller.set_coordinates(Some(here())).await.unwrap();
    assert_eq!(backend.nearby_calls(), 1);

    backend.set_rides(vec![ride(5, 1)]);
    tokio::time::sleep(Duration::from_secs(121)).await;
    assert_eq!(backend.nearby_calls(), 2);
    assert_eq!(ids(poller.snapshot().await.rides()), [5]);

    poller.set_coordinates(None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(backend.nearby_calls(), 2);
    assert!(poller.snapshot().await.rides().is_empty());
    poller.shutdown();
}

#[tokio::test]
async fn listing_nearest_first_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(9, 1), ride(2, 1), ride(5, 1)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(Coordinate::from((33.8966, 35.4823))).await.unwrap();

    let order: Vec<RideId> = poller
        .snapshot()
        .await
        .listing()
        .iter()
        .map(|view| view.ride.id)
        .collect();
    assert_eq!(order, [2, 5, 9]);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_does_not_overwrite_newer_one_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    backend.delay_next_fetch(Duration::from_secs(10));
    let poller = Arc::new(Poller::new(backend.clone(), settings(), Some(USER)));

    let slow = tokio::spawn({
        let poller = poller.clone();
        async move { poller.fetch_nearby_rides(here()).await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(poller.snapshot().await.is_loading());

    backend.set_rides(vec![ride(2, 2)]);
    poller.refresh().await.unwrap();
    let state = poller.snapshot().await;
    assert_eq!(ids(state.rides()), [2]);
    assert!(!state.is_loading());

    slow.await.unwrap().unwrap();
    let state = poller.snapshot().await;
    assert_eq!(ids(state.rides()), [2]);
    assert!(!state.is_loading());
    assert_eq!(backend.nearby_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn clock_tick_marks_departed_rides_test() {
    let base = Utc::now();
    let started = tokio::time::Instant::now();
    let clock = move || -> DateTime<Utc> {
        base + chrono::Duration::from_std(started.elapsed()).unwrap_or_default()
    };

    let backend = MockBackend::default();
    let mut soon = ride(1, 2);
    soon.departure_time = time::format_wire(&(base + chrono::Duration::seconds(90)));
    backend.set_rides(vec![soon]);
    let poller = Poller::with_clock(backend.clone(), settings(), Some(USER), clock);
    poller.start().await;
    poller.set_coordinates(Some(here())).await.unwrap();

    let state = poller.snapshot().await;
    assert_eq!(state.action_for(&state.rides()[0]), RideAction::Requestable);

    tokio::time::sleep(Duration::from_secs(121)).await;
    let state = poller.snapshot().await;
    assert_eq!(
        state.action_for(&state.rides()[0]),
        RideAction::NotAvailable(Unavailable::Started)
    );
    assert!(matches!(poller.request_ride(1).await, Err(Error::Departed)));
    poller.shutdown();
}

#[tokio::test]
async fn rejected_request_changes_nothing_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_nearby_rides(here()).await.unwrap();

    backend.fail_actions(StatusCode::CONFLICT, "You already requested this ride");
    let result = poller.request_ride(1).await;
    assert!(matches!(result, Err(Error::Api(_))));
    let state = poller.snapshot().await;
    assert_eq!(state.error(), Some("You already requested this ride"));
    assert_eq!(state.status_of(1), None);
    assert_eq!(state.rides()[0].available_seats, 2);
    assert_eq!(state.busy_ride(), None);
    assert_eq!(state.action_for(&state.rides()[0]), RideAction::Requestable);
    assert_eq!(*backend.0.request_calls.lock().unwrap(), [1]);
    assert_eq!(backend.nearby_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_cancel_keeps_request_test() {
    let backend = MockBackend::default();
    backend.set_rides(vec![ride(1, 2)]);
    backend.set_requests(vec![pending(1)]);
    let poller = Poller::new(backend.clone(), settings(), Some(USER));
    poller.fetch_user_requested_rides().await.unwrap();
    poller.fetch_nearby_rides(here()).await.unwrap();

    backend.fail_actions(StatusCode::BAD_REQUEST, "Request can no longer be cancelled");
    let result = poller.cancel_ride(1, &FixedAnswer(true)).await;
    assert!(matches!(result, Err(Error::Api(_))));
    let state = poller.snapshot().await;
    assert_eq!(state.error(), Some("Request can no longer be cancelled"));
    assert_eq!(state.status_of(1), Some(RequestStatus::Pending));
    assert_eq!(state.rides()[0].available_seats, 2);
    assert_eq!(state.busy_ride(), None);
    assert_eq!(*backend.0.cancel_calls.lock().unwrap(), [1]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(backend.nearby_calls(), 1);
    assert_eq!(poller.snapshot().await.rides()[0].available_seats, 2);
}
