use chrono::{Duration, Utc};
use poolify::{
    discovery::{RideAction, Unavailable},
    models::{RequestStatus, Ride},
    shared::time,
};

fn ride(seats: u32, departs_in: Duration) -> Ride {
    Ride {
        id: 1,
        driver_name: "Rami".into(),
        driver_phone: "70123456".into(),
        car_model: "Corolla".into(),
        car_plate: "B 123456".into(),
        start_address: "Hamra".into(),
        end_address: "Jounieh".into(),
        start_lat: 33.8966,
        start_lon: 35.4823,
        fare: 3.0,
        available_seats: seats,
        departure_time: time::format_wire(&(Utc::now() + departs_in)),
        pickup_comment: None,
    }
}

#[test]
fn requestable_test() {
    let action = RideAction::evaluate(Utc::now(), &ride(2, Duration::hours(1)), None);
    assert_eq!(action, RideAction::Requestable);
    assert_eq!(action.label(), "Request Ride");
    assert!(action.is_enabled());
}

#[test]
fn rejected_is_requestable_again_test() {
    let action = RideAction::evaluate(
        Utc::now(),
        &ride(2, Duration::hours(1)),
        Some(RequestStatus::Rejected),
    );
    assert_eq!(action, RideAction::Requestable);
}

#[test]
fn pending_and_accepted_can_cancel_test() {
    let upcoming = ride(0, Duration::hours(1));
    for status in [RequestStatus::Pending, RequestStatus::Accepted] {
        let action = RideAction::evaluate(Utc::now(), &upcoming, Some(status));
        assert_eq!(action, RideAction::RequestPending);
        assert_eq!(action.label(), "Cancel");
    }
}

#[test]
fn departed_wins_test() {
    let gone = ride(3, Duration::minutes(-5));
    for status in [None, Some(RequestStatus::Pending), Some(RequestStatus::Rejected)] {
        let action = RideAction::evaluate(Utc::now(), &gone, status);
        assert_eq!(action, RideAction::NotAvailable(Unavailable::Started));
        assert_eq!(action.label(), "Ride Started");
        assert!(!action.is_enabled());
    }
}

#[test]
fn full_ride_test() {
    let action = RideAction::evaluate(Utc::now(), &ride(0, Duration::hours(2)), None);
    assert_eq!(action, RideAction::NotAvailable(Unavailable::Full));
    assert_eq!(action.label(), "Not Available");
}

#[test]
fn clock_moves_ride_to_started_test() {
    let upcoming = ride(1, Duration::minutes(30));
    let now = Utc::now();
    assert_eq!(
        RideAction::evaluate(now, &upcoming, None),
        RideAction::Requestable
    );
    assert_eq!(
        RideAction::evaluate(now + Duration::hours(1), &upcoming, None),
        RideAction::NotAvailable(Unavailable::Started)
    );
}

#[test]
fn unreadable_departure_test() {
    let mut broken = ride(4, Duration::hours(1));
    broken.departure_time = "soon".into();
    assert_eq!(
        RideAction::evaluate(Utc::now(), &broken, None),
        RideAction::NotAvailable(Unavailable::Started)
    );
}
