//! Client-side form checks, run before anything is sent to the backend.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    api::{LoginRequest, SignupRequest},
    models::{Account, NewFeedback, NewRide, Role, ANONYMOUS},
    shared::{geo::Coordinate, time},
};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_FEEDBACK_LEN: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Full Name must contain only letters and spaces.")]
    InvalidName,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Please enter your license number.")]
    MissingLicense,
    #[error("Only drivers can post rides.")]
    DriversOnly,
    #[error("Seats must be a whole number of at least 1.")]
    InvalidSeats,
    #[error("Fare must be a non-negative amount with at most two decimals.")]
    InvalidFare,
    #[error("Please enter a valid departure date (YYYY-MM-DD) and time (HH:MM).")]
    InvalidDeparture,
    #[error("Departure must be in the future.")]
    DepartureInPast,
    #[error("Feedback must be at least 10 characters.")]
    FeedbackTooShort,
    #[error("Rating must be between 1 and 5.")]
    InvalidRating,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub license_number: String,
}

#[derive(Debug, Clone, Default)]
pub struct RideForm {
    pub pickup: String,
    pub dropoff: String,
    pub date: String,
    pub time: String,
    pub seats: String,
    pub fare: String,
    pub car_model: String,
    pub car_plate: String,
    pub driver_phone: String,
    pub pickup_comment: String,
    pub start: Option<Coordinate>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub text: String,
    pub author: String,
    pub rate: u8,
}

pub fn validate_signup(form: &SignupForm) -> Result<SignupRequest, self::Error> {
    let email = validate_email(&form.email)?;
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::PasswordTooShort);
    }
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(Error::MissingField("full name"));
    }
    if !full_name
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace())
    {
        return Err(Error::InvalidName);
    }
    if form.password != form.confirm_password {
        return Err(Error::PasswordMismatch);
    }
    if form.role == Role::Driver && form.license_number.trim().is_empty() {
        return Err(Error::MissingLicense);
    }
    Ok(SignupRequest {
        full_name: full_name.to_string(),
        email,
        password: form.password.clone(),
    })
}

pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, self::Error> {
    let email = validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::PasswordTooShort);
    }
    Ok(LoginRequest {
        email,
        password: password.to_string(),
    })
}

pub fn validate_ride(
    form: &RideForm,
    driver: &Account,
    now: DateTime<Utc>,
) -> Result<NewRide, self::Error> {
    if driver.role != Role::Driver {
        return Err(Error::DriversOnly);
    }
    let pickup = required(&form.pickup, "pickup")?;
    let dropoff = required(&form.dropoff, "dropoff")?;
    let car_model = required(&form.car_model, "car model")?;
    let car_plate = required(&form.car_plate, "license plate")?;
    let seats = parse_seats(&form.seats)?;
    let fare = parse_fare(&form.fare)?;

    if form.date.trim().is_empty() {
        return Err(Error::MissingField("date"));
    }
    if form.time.trim().is_empty() {
        return Err(Error::MissingField("time"));
    }
    let departure = time::parse_date_time(&form.date, &form.time).ok_or(Error::InvalidDeparture)?;
    if departure <= now {
        return Err(Error::DepartureInPast);
    }

    let driver_phone = match form.driver_phone.trim() {
        "" => driver
            .driver_info
            .as_ref()
            .map(|info| info.phone_number.clone())
            .unwrap_or_default(),
        phone => phone.to_string(),
    };
    let pickup_comment = Some(form.pickup_comment.trim())
        .filter(|comment| !comment.is_empty())
        .map(str::to_string);

    Ok(NewRide {
        start_address: pickup,
        end_address: dropoff,
        start_lat: form.start.map(|at| at.latitude),
        start_lon: form.start.map(|at| at.longitude),
        departure_time: time::format_wire(&departure),
        available_seats: seats,
        fare,
        car_model,
        car_plate,
        driver_phone,
        pickup_comment,
        driver_id: driver.user_id,
    })
}

/// `fallback_author` is the signed-in user's name, if any.
pub fn validate_feedback(
    form: &FeedbackForm,
    fallback_author: Option<&str>,
) -> Result<NewFeedback, self::Error> {
    let comment = form.text.trim();
    if comment.chars().count() < MIN_FEEDBACK_LEN {
        return Err(Error::FeedbackTooShort);
    }
    if !(1..=5).contains(&form.rate) {
        return Err(Error::InvalidRating);
    }
    let author = [Some(form.author.as_str()), fallback_author]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|author| !author.is_empty())
        .unwrap_or(ANONYMOUS);
    Ok(NewFeedback {
        comment: comment.to_string(),
        rate: form.rate,
        author: author.to_string(),
    })
}

fn required(value: &str, field: &'static str) -> Result<String, self::Error> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

fn validate_email(email: &str) -> Result<String, self::Error> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::MissingField("email"));
    }
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') && !domain.starts_with('.') => {
            Ok(email.to_string())
        }
        _ => Err(Error::InvalidEmail),
    }
}

fn parse_seats(value: &str) -> Result<u32, self::Error> {
    match value.trim().parse::<u32>() {
        Ok(seats) if seats >= 1 => Ok(seats),
        Err(_) if value.trim().is_empty() => Err(Error::MissingField("seats")),
        _ => Err(Error::InvalidSeats),
    }
}

fn parse_fare(value: &str) -> Result<f64, self::Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField("price"));
    }
    if let Some((_, decimals)) = value.split_once('.') {
        if decimals.len() > 2 {
            return Err(Error::InvalidFare);
        }
    }
    match value.parse::<f64>() {
        Ok(fare) if fare.is_finite() && fare >= 0.0 => Ok(fare),
        _ => Err(Error::InvalidFare),
    }
}
