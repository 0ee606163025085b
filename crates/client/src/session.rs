use chrono::Utc;
use poolify::{
    account::AccountStore,
    api::ApiClient,
    config::Config,
    discovery::{self, PollSettings, Poller},
    geocode::{Debouncer, GeocodeClient, Suggestions},
    location::{self, Acquired, FixedPosition, ManualReason, Position, PositionError, PositionOptions},
    models::{HistoryEntry, HistoryKind, Ride, RideId},
    shared::geo::{Coordinate, Distance},
};
use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{error::AppError, input::Input, render};

enum Action {
    Refresh,
    Request(RideId),
    Cancel(RideId),
    Move(Coordinate),
    List,
    Quit,
}

fn parse(line: &str) -> Result<Action, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let argument = words.next();
    let ride_id = || {
        argument
            .and_then(|id| id.trim_start_matches('#').parse::<RideId>().ok())
            .ok_or_else(|| format!("Usage: {command} <ride id>"))
    };
    match command {
        "refresh" | "f" => Ok(Action::Refresh),
        "request" | "r" => ride_id().map(Action::Request),
        "cancel" | "c" => ride_id().map(Action::Cancel),
        "move" | "m" => argument
            .ok_or_else(|| "Usage: move <lat,lon>".to_string())?
            .parse()
            .map(Action::Move),
        "" | "list" | "l" => Ok(Action::List),
        "quit" | "q" | "exit" => Ok(Action::Quit),
        other => Err(format!("Unknown command `{other}`")),
    }
}

/// The interactive ride list: locate the user, then list, request and cancel until they quit.
pub async fn run(
    config: &Config,
    store: &mut AccountStore,
    api: ApiClient,
    at: Option<Coordinate>,
    accuracy: f64,
    input: &Input,
) -> Result<(), AppError> {
    let source = match at {
        Some(coordinate) => FixedPosition(Ok(Position {
            coordinate,
            accuracy: Distance::from_meters(accuracy),
        })),
        None => FixedPosition(Err(PositionError::Unavailable)),
    };
    let options = PositionOptions::from(config);
    let coordinate = match location::acquire(&source, input, options, config.accuracy_threshold).await
    {
        Acquired::Located(at) => Some(at),
        Acquired::ManualEntry(reason) => {
            match reason {
                ManualReason::Imprecise(accuracy) => {
                    println!("Location only accurate to {accuracy}, enter an address instead.")
                }
                ManualReason::Failed(err) => println!("{err}, enter an address instead."),
            }
            match enter_address(config, input).await? {
                Some((name, at)) => {
                    println!("Searching near {name}");
                    Some(at)
                }
                None => None,
            }
        }
    };

    let user_id = store.active_account().and_then(|account| account.user_id);
    if user_id.is_none() {
        println!("Browsing as a guest. Sign in to request rides.");
    }
    let poller = Poller::new(api, PollSettings::from(config), user_id);
    poller.start().await;
    if let Err(err) = poller.set_coordinates(coordinate).await {
        debug!("Initial ride fetch failed: {err}");
    }
    render::discovery(&poller.snapshot().await);

    let mut redraw = time::interval(config.clock_interval);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    redraw.tick().await;

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                poller.tick_clock().await;
                render::discovery(&poller.snapshot().await);
            }
            line = input.next_line() => {
                let Some(line) = line else {
                    break;
                };
                let action = match parse(&line) {
                    Ok(action) => action,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                };
                match action {
                    Action::Quit => break,
                    Action::List => {}
                    Action::Refresh => {
                        if let Err(err) = poller.refresh().await {
                            println!("! {err}");
                        }
                    }
                    Action::Move(at) => {
                        if let Err(err) = poller.set_coordinates(Some(at)).await {
                            debug!("Ride fetch after move failed: {err}");
                        }
                    }
                    Action::Request(ride_id) => {
                        let ride = poller.snapshot().await.ride(ride_id).cloned();
                        match poller.request_ride(ride_id).await {
                            Ok(()) => {
                                println!("Requested ride #{ride_id}");
                                record(store, HistoryKind::Requested, ride_id, ride.as_ref());
                            }
                            Err(err) => println!("! {err}"),
                        }
                    }
                    Action::Cancel(ride_id) => {
                        let ride = poller.snapshot().await.ride(ride_id).cloned();
                        match poller.cancel_ride(ride_id, input).await {
                            Ok(()) => {
                                println!("Cancelled your request on ride #{ride_id}");
                                record(store, HistoryKind::Cancelled, ride_id, ride.as_ref());
                            }
                            Err(discovery::Error::Declined) => println!("Kept your request."),
                            Err(err) => println!("! {err}"),
                        }
                    }
                }
                render::discovery(&poller.snapshot().await);
            }
        }
    }

    poller.shutdown();
    Ok(())
}

/// Asks for an address until the user picks a suggestion or gives up.
async fn enter_address(
    config: &Config,
    input: &Input,
) -> Result<Option<(String, Coordinate)>, AppError> {
    let debouncer = Debouncer::new(
        GeocodeClient::new(config)?,
        config.debounce_delay,
        config.min_query_len,
    );
    let mut results = debouncer.subscribe();
    loop {
        let Some(text) = input.ask("Address (empty to skip):").await else {
            return Ok(None);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if let Ok(at) = text.parse::<Coordinate>() {
            return Ok(Some((at.to_string(), at)));
        }

        debouncer.input(text);
        let suggestions = settled(&mut results, text).await;
        if let Some(error) = &suggestions.error {
            println!("! {error}");
            continue;
        }
        render::suggestions(&suggestions.items);
        if suggestions.items.is_empty() {
            continue;
        }

        let Some(choice) = input.ask("Pick a number:").await else {
            return Ok(None);
        };
        let picked = choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| location::pick(&suggestions.items, index));
        match picked {
            Some(picked) => return Ok(Some(picked)),
            None => println!("Not one of the suggestions."),
        }
    }
}

async fn settled(results: &mut watch::Receiver<Suggestions>, query: &str) -> Suggestions {
    loop {
        {
            let current = results.borrow_and_update();
            if current.query == query {
                return current.clone();
            }
        }
        if results.changed().await.is_err() {
            return Suggestions::default();
        }
    }
}

fn record(store: &mut AccountStore, kind: HistoryKind, ride_id: RideId, ride: Option<&Ride>) {
    let entry = HistoryEntry {
        kind,
        ride_id: Some(ride_id),
        from: ride.map(|ride| ride.start_address.clone()).unwrap_or_default(),
        to: ride.map(|ride| ride.end_address.clone()).unwrap_or_default(),
        fare: ride.map_or(0.0, |ride| ride.fare),
        recorded_at: Utc::now(),
    };
    if let Err(err) = store.add_ride_history(entry) {
        warn!("Could not record ride history: {err}");
    }
}
