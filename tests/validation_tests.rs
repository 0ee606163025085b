use chrono::{Duration, Utc};
use poolify::{
    models::{Account, DriverInfo, Role},
    validation::{
        Error, FeedbackForm, RideForm, SignupForm, validate_feedback, validate_login,
        validate_ride, validate_signup,
    },
};

fn signup() -> SignupForm {
    SignupForm {
        full_name: "Maya Khoury".into(),
        email: "maya@example.com".into(),
        password: "longenough".into(),
        confirm_password: "longenough".into(),
        role: Role::Passenger,
        license_number: String::new(),
    }
}

fn driver() -> Account {
    Account {
        id: 1,
        email: "rami@example.com".into(),
        full_name: "Rami".into(),
        role: Role::Driver,
        user_id: Some(12),
        token: Some("t".into()),
        driver_info: Some(DriverInfo {
            license_number: "L-1".into(),
            car_plate: "B 123".into(),
            car_model: "Corolla".into(),
            phone_number: "+961 70 000 000".into(),
        }),
        ride_history: Vec::new(),
    }
}

fn ride_form() -> RideForm {
    let later = Utc::now() + Duration::days(2);
    RideForm {
        pickup: "Hamra".into(),
        dropoff: "Byblos".into(),
        date: later.format("%Y-%m-%d").to_string(),
        time: "09:30".into(),
        seats: "3".into(),
        fare: "4.50".into(),
        car_model: "Corolla".into(),
        car_plate: "B 123".into(),
        driver_phone: String::new(),
        pickup_comment: "  ".into(),
        start: None,
    }
}

#[test]
fn signup_test() {
    let request = validate_signup(&signup()).unwrap();
    assert_eq!(request.full_name, "Maya Khoury");
    assert_eq!(request.email, "maya@example.com");
}

#[test]
fn signup_errors_test() {
    let cases = [
        (SignupForm { email: "maya".into(), ..signup() }, Error::InvalidEmail),
        (SignupForm { password: "short".into(), ..signup() }, Error::PasswordTooShort),
        (SignupForm { full_name: "Maya 2".into(), ..signup() }, Error::InvalidName),
        (
            SignupForm { confirm_password: "different".into(), ..signup() },
            Error::PasswordMismatch,
        ),
        (SignupForm { role: Role::Driver, ..signup() }, Error::MissingLicense),
    ];
    for (form, expected) in cases {
        assert_eq!(validate_signup(&form).unwrap_err(), expected);
    }
}

#[test]
fn login_test() {
    assert!(validate_login("maya@example.com", "longenough").is_ok());
    assert_eq!(
        validate_login("", "longenough").unwrap_err(),
        Error::MissingField("email")
    );
}

#[test]
fn ride_test() {
    let ride = validate_ride(&ride_form(), &driver(), Utc::now()).unwrap();
    assert_eq!(ride.available_seats, 3);
    assert_eq!(ride.fare, 4.5);
    assert_eq!(ride.driver_phone, "+961 70 000 000");
    assert_eq!(ride.pickup_comment, None);
    assert_eq!(ride.driver_id, Some(12));
    assert!(ride.departure_time.ends_with('Z'));
}

#[test]
fn ride_errors_test() {
    let now = Utc::now();
    let passenger = Account {
        role: Role::Passenger,
        ..driver()
    };
    assert_eq!(
        validate_ride(&ride_form(), &passenger, now).unwrap_err(),
        Error::DriversOnly
    );

    let cases = [
        (RideForm { seats: "0".into(), ..ride_form() }, Error::InvalidSeats),
        (RideForm { seats: "two".into(), ..ride_form() }, Error::InvalidSeats),
        (RideForm { fare: "4.505".into(), ..ride_form() }, Error::InvalidFare),
        (RideForm { fare: "-1".into(), ..ride_form() }, Error::InvalidFare),
        (RideForm { pickup: " ".into(), ..ride_form() }, Error::MissingField("pickup")),
        (RideForm { time: "9am".into(), ..ride_form() }, Error::InvalidDeparture),
        (RideForm { date: "2001-01-01".into(), ..ride_form() }, Error::DepartureInPast),
    ];
    for (form, expected) in cases {
        assert_eq!(validate_ride(&form, &driver(), now).unwrap_err(), expected);
    }
}

#[test]
fn feedback_test() {
    let form = FeedbackForm {
        text: "Smooth ride, friendly driver".into(),
        author: String::new(),
        rate: 5,
    };
    assert_eq!(validate_feedback(&form, Some("Maya")).unwrap().author, "Maya");
    assert_eq!(validate_feedback(&form, None).unwrap().author, "Anonymous");

    let short = FeedbackForm {
        text: "ok".into(),
        ..form.clone()
    };
    assert_eq!(validate_feedback(&short, None).unwrap_err(), Error::FeedbackTooShort);

    let unrated = FeedbackForm { rate: 0, ..form };
    assert_eq!(validate_feedback(&unrated, None).unwrap_err(), Error::InvalidRating);
}
