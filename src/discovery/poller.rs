use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures_util::future;
use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{DiscoveryState, Error, PollSettings, RideAction, RideBackend, Unavailable};
use crate::{
    models::{RideId, UserId, requests_by_ride},
    shared::{Clock, Prompt, geo::Coordinate},
};

pub const CANCEL_PROMPT: &str = "Cancel your request for this ride? This cannot be undone.";

/// Keeps the nearby ride list and the user's request map fresh.
///
/// Background work (passive refresh, clock tick, post-cancel reconcile) runs in
/// tokio tasks owned by the poller and aborted when it is shut down or dropped.
pub struct Poller<B> {
    shared: Arc<Shared<B>>,
    tasks: Mutex<Tasks>,
}

struct Shared<B> {
    backend: B,
    settings: PollSettings,
    user_id: Option<UserId>,
    clock: Box<dyn Clock>,
    state: RwLock<DiscoveryState>,
}

#[derive(Default)]
struct Tasks {
    refresh: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
    reconcile: Option<JoinHandle<()>>,
}

fn swap(slot: &mut Option<JoinHandle<()>>, handle: Option<JoinHandle<()>>) {
    if let Some(old) = std::mem::replace(slot, handle) {
        old.abort();
    }
}

impl<B: RideBackend> Poller<B> {
    pub fn new(backend: B, settings: PollSettings, user_id: Option<UserId>) -> Self {
        Self::with_clock(backend, settings, user_id, Utc::now)
    }

    /// Like [`Poller::new`], reading the current time from `clock`.
    pub fn with_clock(
        backend: B,
        settings: PollSettings,
        user_id: Option<UserId>,
        clock: impl Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            shared: Arc::new(Shared {
                backend,
                settings,
                user_id,
                clock: Box::new(clock),
                state: RwLock::new(DiscoveryState::new(now)),
            }),
            tasks: Mutex::new(Tasks::default()),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.shared.user_id
    }

    pub async fn snapshot(&self) -> DiscoveryState {
        self.shared.state.read().await.clone()
    }

    /// Loads the user's requests once and starts the clock tick.
    pub async fn start(&self) {
        if self.shared.user_id.is_some() {
            if let Err(err) = self.shared.fetch_user_requested_rides().await {
                warn!("Initial request sync failed: {err}");
            }
        }
        let shared = self.shared.clone();
        let handle = tokio::spawn(shared.run_clock());
        swap(&mut self.tasks().clock, Some(handle));
    }

    /// Sets the search position. `Some` fetches right away and (re)starts the
    /// passive refresh; `None` clears the list and stops it.
    pub async fn set_coordinates(&self, coordinates: Option<Coordinate>) -> Result<(), Error> {
        swap(&mut self.tasks().refresh, None);
        let Some(at) = coordinates else {
            let mut state = self.shared.state.write().await;
            state.set_coordinates(None);
            state.set_error(Error::NoLocation.to_string());
            info!("Location cleared, passive refresh stopped");
            return Ok(());
        };
        self.shared.state.write().await.set_coordinates(Some(at));

        let result = self.shared.fetch_nearby_rides(at).await;
        let shared = self.shared.clone();
        let handle = tokio::spawn(shared.run_refresh());
        swap(&mut self.tasks().refresh, Some(handle));
        result
    }

    /// Fetches rides around `at`, replacing the current list.
    pub async fn fetch_nearby_rides(&self, at: Coordinate) -> Result<(), Error> {
        self.shared.state.write().await.set_coordinates(Some(at));
        self.shared.fetch_nearby_rides(at).await
    }

    /// Re-fetches rides around the last known position.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.shared.refresh().await
    }

    pub async fn fetch_user_requested_rides(&self) -> Result<(), Error> {
        self.shared.fetch_user_requested_rides().await
    }

    pub async fn tick_clock(&self) {
        self.shared.tick_clock().await;
    }

    pub async fn request_ride(&self, ride_id: RideId) -> Result<(), Error> {
        let user_id = self.shared.user_id.ok_or(Error::NotSignedIn)?;
        {
            let mut state = self.shared.state.write().await;
            state.set_now(self.shared.now());
            let action = state
                .ride(ride_id)
                .map(|ride| state.action_for(ride))
                .ok_or(Error::UnknownRide(ride_id))?;
            let guard = match action {
                RideAction::Requestable => Ok(()),
                RideAction::RequestPending => Err(Error::AlreadyRequested),
                RideAction::NotAvailable(Unavailable::Started) => Err(Error::Departed),
                RideAction::NotAvailable(Unavailable::Full) => Err(Error::Full),
            };
            if let Err(err) = guard {
                state.set_error(err.to_string());
                return Err(err);
            }
            state.clear_error();
            state.set_busy_ride(Some(ride_id));
        }

        let result = self.shared.backend.request_ride(ride_id, user_id).await;
        let mut state = self.shared.state.write().await;
        state.set_busy_ride(None);
        if let Err(err) = result {
            warn!("Request on ride {ride_id} failed: {err}");
            state.set_error(err.to_string());
            return Err(err.into());
        }
        drop(state);

        info!("Requested ride {ride_id}");
        self.shared.resync().await;
        Ok(())
    }

    /// Cancels the user's request after `prompt` confirms it.
    pub async fn cancel_ride<P: Prompt + ?Sized>(
        &self,
        ride_id: RideId,
        prompt: &P,
    ) -> Result<(), Error> {
        let user_id = self.shared.user_id.ok_or(Error::NotSignedIn)?;
        {
            let mut state = self.shared.state.write().await;
            state.set_now(self.shared.now());
            let cancellable = match state.ride(ride_id) {
                Some(ride) => state.action_for(ride) == RideAction::RequestPending,
                None => state.status_of(ride_id).is_some_and(|status| status.is_active()),
            };
            if !cancellable {
                let err = Error::NotRequested;
                state.set_error(err.to_string());
                return Err(err);
            }
        }

        if !prompt.confirm(CANCEL_PROMPT) {
            debug!("Cancellation of ride {ride_id} declined");
            return Err(Error::Declined);
        }

        self.shared.state.write().await.set_busy_ride(Some(ride_id));
        let result = self.shared.backend.cancel_request(ride_id, user_id).await;
        let mut state = self.shared.state.write().await;
        state.set_busy_ride(None);
        if let Err(err) = result {
            warn!("Cancel on ride {ride_id} failed: {err}");
            state.set_error(err.to_string());
            return Err(err.into());
        }
        state.clear_error();
        state.apply_cancel(ride_id);
        drop(state);

        info!("Cancelled request on ride {ride_id}");
        let shared = self.shared.clone();
        let delay = self.shared.settings.reconcile_delay;
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            shared.resync().await;
        });
        swap(&mut self.tasks().reconcile, Some(handle));
        Ok(())
    }

    /// Stops every background task. In-flight fetches are dropped with them.
    pub fn shutdown(&self) {
        let mut tasks = self.tasks();
        swap(&mut tasks.refresh, None);
        swap(&mut tasks.clock, None);
        swap(&mut tasks.reconcile, None);
    }
}

impl<B> Poller<B> {
    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B> Drop for Poller<B> {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in [&mut tasks.refresh, &mut tasks.clock, &mut tasks.reconcile] {
            swap(handle, None);
        }
    }
}

impl<B> Shared<B> {
    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn tick_clock(&self) {
        let now = self.now();
        self.state.write().await.set_now(now);
    }
}

impl<B: RideBackend> Shared<B> {
    async fn fetch_nearby_rides(&self, at: Coordinate) -> Result<(), Error> {
        let ticket = self.state.write().await.begin_fetch();
        let result = self.backend.nearby_rides(at, self.settings.radius).await;

        let mut state = self.state.write().await;
        if !state.finish_fetch(ticket) {
            debug!("Discarding superseded ride fetch around {at}");
            return Ok(());
        }
        match result {
            Ok(rides) => {
                debug!("Replacing ride list with {} rides", rides.len());
                state.replace_rides(rides, self.now());
                Ok(())
            }
            Err(err) => {
                warn!("Fetching nearby rides failed: {err}");
                state.fail_fetch(err.to_string());
                Err(err.into())
            }
        }
    }

    async fn refresh(&self) -> Result<(), Error> {
        let at = self
            .state
            .read()
            .await
            .coordinates()
            .ok_or(Error::NoLocation)?;
        self.fetch_nearby_rides(at).await
    }

    async fn fetch_user_requested_rides(&self) -> Result<(), Error> {
        let user_id = self.user_id.ok_or(Error::NotSignedIn)?;
        let result = self.backend.user_requests(user_id).await;
        let mut state = self.state.write().await;
        match result {
            Ok(requests) => {
                state.replace_requests(requests_by_ride(requests));
                Ok(())
            }
            Err(err) => {
                warn!("Fetching user requests failed: {err}");
                state.set_error(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Pulls both the request map and the ride list back in line with the backend.
    async fn resync(&self) {
        let (requests, rides) =
            future::join(self.fetch_user_requested_rides(), self.refresh()).await;
        if let Err(err) = requests {
            debug!("Request resync failed: {err}");
        }
        if let Err(err) = rides {
            debug!("Ride resync failed: {err}");
        }
    }

    async fn run_refresh(self: Arc<Self>) {
        let mut interval = time::interval(self.settings.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; the caller has just fetched.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(at) = self.state.read().await.coordinates() else {
                break;
            };
            debug!("Passive refresh around {at}");
            let _ = self.fetch_nearby_rides(at).await;
        }
    }

    async fn run_clock(self: Arc<Self>) {
        let mut interval = time::interval(self.settings.clock_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            self.tick_clock().await;
        }
    }
}
