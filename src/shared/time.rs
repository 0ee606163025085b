use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Where the poller reads "now" from. Any `Fn() -> DateTime<Utc>` works, `Utc::now` included.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Parses the backend's "ISO-ish" departure strings.
///
/// RFC 3339 strings keep their offset; naive date-times are read as local time.
pub fn parse_departure(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(local_to_utc)
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` time typed by the user.
pub fn parse_date_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M").ok()?;
    local_to_utc(date.and_time(time))
}

pub fn format_local(time: &DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Wire format used when posting rides.
pub fn format_wire(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
}

#[test]
fn parse_rfc3339() {
    let time = parse_departure("2025-07-20T14:30:00Z").unwrap();
    assert_eq!(format_wire(&time), "2025-07-20T14:30:00Z");
}

#[test]
fn parse_offset() {
    let time = parse_departure("2025-07-20T17:30:00+03:00").unwrap();
    assert_eq!(format_wire(&time), "2025-07-20T14:30:00Z");
}

#[test]
fn parse_naive_variants() {
    let a = parse_departure("2025-07-20T14:30:00").unwrap();
    let b = parse_departure("2025-07-20T14:30").unwrap();
    let c = parse_departure("2025-07-20 14:30:00").unwrap();
    let d = parse_departure("2025-07-20T14:30:00.000").unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert_eq!(a, d);
}

#[test]
fn parse_invalid() {
    assert!(parse_departure("").is_none());
    assert!(parse_departure("tomorrow").is_none());
    assert!(parse_departure("2025-13-20T14:30").is_none());
}

#[test]
fn parse_form_date_time() {
    let time = parse_date_time("2025-07-20", "14:30").unwrap();
    assert_eq!(Some(time), parse_departure("2025-07-20T14:30"));
    assert!(parse_date_time("2025-07-20", "2pm").is_none());
}
