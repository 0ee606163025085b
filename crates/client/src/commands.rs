use chrono::Utc;
use poolify::{
    account::AccountStore,
    admin::{AdminPanel, Decision},
    api::ApiClient,
    auth,
    chat::ChatLog,
    config::Config,
    geocode::GeocodeClient,
    models::{Account, HistoryEntry, HistoryKind},
    shared::geo::Coordinate,
    validation::{self, FeedbackForm, RideForm, SignupForm},
};
use tracing::{debug, info};

use crate::{
    cli::{AdminAction, Args, Command},
    error::AppError,
    input::Input,
    render, session,
};

pub async fn run(args: Args) -> Result<(), AppError> {
    let config = args.config();
    let mut store = AccountStore::open(&config.accounts_path)?;
    let token = store
        .active_account()
        .and_then(|account| account.token.clone());
    let api = ApiClient::new(&config)?.with_token(token.as_deref());

    match args.command {
        Command::Signup {
            name,
            email,
            password,
            confirm,
            role,
            license,
        } => {
            let form = SignupForm {
                full_name: name,
                email,
                password,
                confirm_password: confirm,
                role,
                license_number: license,
            };
            let id = auth::sign_up(&api, &mut store, &form).await?;
            println!("Welcome! Signed in as account {id}.");
        }
        Command::Login { email, password } => {
            let id = auth::log_in(&api, &mut store, &email, &password).await?;
            println!("Signed in as account {id}.");
        }
        Command::Accounts => {
            if store.accounts().is_empty() {
                println!("No stored accounts.");
            }
            let active = store.active_account_id();
            for account in store.accounts() {
                render::account(account, active == Some(account.id));
            }
        }
        Command::Switch { id } => {
            store.switch_account(id)?;
            println!("Switched to account {id}.");
        }
        Command::Logout { id } => {
            match id {
                Some(id) => store.remove_account(id)?,
                None => store.logout_active()?,
            }
            match store.active_account() {
                Some(account) => println!("Signed out. Now using {}.", account.display_name()),
                None => println!("Signed out."),
            }
        }
        Command::Rides { at, accuracy, .. } => {
            let input = Input::spawn();
            session::run(&config, &mut store, api, at, accuracy, &input).await?;
        }
        Command::Post {
            pickup,
            dropoff,
            date,
            time,
            seats,
            price,
            car_model,
            plate,
            phone,
            comment,
            at,
        } => {
            let account = active(&store)?.clone();
            let start = match at {
                Some(at) => Some(at),
                None => locate(&config, &pickup).await,
            };
            let form = RideForm {
                pickup,
                dropoff,
                date,
                time,
                seats,
                fare: price,
                car_model,
                car_plate: plate,
                driver_phone: phone,
                pickup_comment: comment,
                start,
            };
            let ride = validation::validate_ride(&form, &account, Utc::now())?;
            api.post_ride(&ride).await?;
            store.add_ride_history(HistoryEntry {
                kind: HistoryKind::Posted,
                ride_id: None,
                from: ride.start_address.clone(),
                to: ride.end_address.clone(),
                fare: ride.fare,
                recorded_at: Utc::now(),
            })?;
            println!(
                "Posted your ride from {} to {}.",
                ride.start_address, ride.end_address
            );
        }
        Command::Requests => {
            let driver_id = active(&store)?.user_id.ok_or(AppError::NotSignedIn)?;
            let requests = api.driver_requests(driver_id).await?;
            if requests.is_empty() {
                println!("No requests on your rides yet.");
            }
            for request in requests {
                let passenger = match request.passenger_name.trim() {
                    "" => request
                        .passenger_id
                        .map_or_else(|| "Unknown passenger".to_string(), |id| format!("Passenger {id}")),
                    name => name.to_string(),
                };
                println!("Ride #{}: {passenger} ({})", request.ride_id, request.status);
            }
        }
        Command::Admin { action } => {
            let mut panel = AdminPanel::for_account(active(&store)?)?;
            match action {
                Some(AdminAction::Approve { id }) => {
                    panel.decide(&api, id, Decision::Approve).await?;
                    println!("Approved driver {id}.");
                }
                Some(AdminAction::Reject { id }) => {
                    panel.decide(&api, id, Decision::Reject).await?;
                    println!("Rejected driver {id}.");
                }
                None => {
                    panel.refresh(&api).await?;
                    if panel.pending().is_empty() {
                        println!("No drivers waiting for verification.");
                    }
                    for driver in panel.pending() {
                        let license = driver.license_number.as_deref().unwrap_or("-");
                        println!(
                            "{:<6} {} <{}> license {license}",
                            driver.id, driver.name, driver.email
                        );
                    }
                }
            }
        }
        Command::Feedback { text, rate, author } => match text {
            Some(text) => {
                let form = FeedbackForm { text, author, rate };
                let fallback = store.active_account().map(Account::display_name);
                let feedback = validation::validate_feedback(&form, fallback)?;
                let saved = api.submit_feedback(&feedback).await?;
                println!("Thanks for your feedback!");
                render::feedback(&saved);
            }
            None => {
                let feedbacks = api.feedbacks().await?;
                if feedbacks.is_empty() {
                    println!("No feedback yet.");
                }
                feedbacks.iter().for_each(render::feedback);
            }
        },
        Command::Search { query } => {
            let geocoder = GeocodeClient::new(&config)?;
            match query.parse::<Coordinate>() {
                Ok(at) => println!("{}", geocoder.reverse(at).await?),
                Err(_) => render::suggestions(&geocoder.autocomplete(&query).await?),
            }
        }
        Command::Chat { ride } => match ride {
            Some(ride_id) => {
                let author = active(&store)?.display_name().to_string();
                chat(ride_id, &author).await;
            }
            None => {
                let chats = api.chats().await?;
                if chats.is_empty() {
                    println!("No chats yet.");
                }
                for chat in chats {
                    let ride = chat
                        .ride_id
                        .map(|id| format!(" (ride #{id})"))
                        .unwrap_or_default();
                    let title = chat.title.as_deref().unwrap_or("Chat");
                    let last = chat.last_message.as_deref().unwrap_or_default();
                    println!("{:<6} {title}{ride}  {last}", chat.id);
                }
            }
        },
    }
    Ok(())
}

fn active(store: &AccountStore) -> Result<&Account, AppError> {
    store.active_account().ok_or(AppError::NotSignedIn)
}

/// Best effort: the first suggestion for `address`, if the geocoder knows it.
async fn locate(config: &Config, address: &str) -> Option<Coordinate> {
    let geocoder = GeocodeClient::new(config).ok()?;
    match geocoder.autocomplete(address).await {
        Ok(suggestions) => {
            let at = suggestions.first().map(|suggestion| suggestion.coordinate());
            if let Some(at) = at {
                info!("Placed `{address}` at {at}");
            }
            at
        }
        Err(err) => {
            debug!("Could not place `{address}`: {err}");
            None
        }
    }
}

async fn chat(ride_id: i64, author: &str) {
    let input = Input::spawn();
    let mut log = ChatLog::new(ride_id);
    println!("Chat for ride #{}. Messages stay on this device. Empty line to leave.", log.ride_id());
    while let Some(line) = input.ask(">").await {
        if line.trim().is_empty() {
            break;
        }
        if let Some(message) = log.send(author, &line) {
            println!("[{}] {}: {}", message.id, message.author, message.text);
        }
    }
}
