use poolify::{
    discovery::{DiscoveryState, RideView},
    models::{Account, Feedback, LocationSuggestion},
    shared::time,
};

pub fn ride_line(view: &RideView, busy: bool) -> String {
    let ride = &view.ride;
    let departure = ride
        .departs_at()
        .map(|at| time::format_local(&at))
        .unwrap_or_else(|| ride.departure_time.clone());
    let distance = view
        .distance
        .map(|distance| format!(" | {distance} away"))
        .unwrap_or_default();
    let status = view
        .status
        .map(|status| format!(" ({status})"))
        .unwrap_or_default();
    let action = if busy {
        "Working...".to_string()
    } else if view.action.is_enabled() {
        format!("[{}]", view.action.label())
    } else {
        format!("<{}>", view.action.label())
    };
    let mut line = format!(
        "#{:<5} {} -> {} | {} | ${:.2} | {} seats{distance}\n       {} ({}, {}) {}{status}  {action}",
        ride.id,
        ride.start_address,
        ride.end_address,
        departure,
        ride.fare,
        ride.available_seats,
        ride.driver_name,
        ride.car_model,
        ride.car_plate,
        ride.driver_phone,
    );
    if let Some(comment) = ride.pickup_comment.as_deref().filter(|c| !c.trim().is_empty()) {
        line.push_str(&format!("\n       Pickup: {comment}"));
    }
    line
}

pub fn discovery(state: &DiscoveryState) {
    println!();
    match state.coordinates() {
        Some(at) => println!("Rides near {at}"),
        None => println!("No location set"),
    }
    if let Some(fetched) = state.last_fetched() {
        println!("Updated {}", time::format_local(&fetched));
    }
    if let Some(error) = state.error() {
        println!("! {error}");
    }
    let listing = state.listing();
    if listing.is_empty() {
        println!("No rides found.");
    }
    for view in &listing {
        let busy = state.busy_ride() == Some(view.ride.id);
        println!("{}", ride_line(view, busy));
    }
    println!("Commands: f = refresh, r <id> = request, c <id> = cancel, m <lat,lon> = move, q = quit");
}

pub fn suggestions(items: &[LocationSuggestion]) {
    if items.is_empty() {
        println!("No matches.");
    }
    for (index, item) in items.iter().enumerate() {
        println!("{:>2}. {}", index + 1, item.display_name);
    }
}

pub fn account(account: &Account, active: bool) {
    let marker = if active { "*" } else { " " };
    println!(
        "{marker} {:<14} {} <{}> ({})",
        account.id,
        account.display_name(),
        account.email,
        account.role
    );
}

pub fn feedback(feedback: &Feedback) {
    let stars = "*".repeat(feedback.rate.min(5) as usize);
    println!("{stars:<5} \"{}\" - {}", feedback.text, feedback.author);
}
