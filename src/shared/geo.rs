use std::{cmp, fmt::Display, ops::Add};

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_RADIUS: Distance = Distance::from_kilometers(5.0);
pub const ACCURACY_THRESHOLD: Distance = Distance::from_meters(100.0);

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 1000.0 {
            write!(f, "{:.0} m", self.0)
        } else {
            write!(f, "{:.1} km", self.as_kilometers())
        }
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

/// A `[lat, lon]` pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = String;

    /// Parses `"lat,lon"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = value
            .split_once(',')
            .ok_or_else(|| format!("expected `lat,lon`, got `{value}`"))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude `{lat}`"))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude `{lon}`"))?;
        let coordinate = Self {
            latitude,
            longitude,
        };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(format!("coordinate out of range: {coordinate}"))
        }
    }
}

impl Coordinate {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance (haversine).
    pub fn distance(&self, coord: &Self) -> Distance {
        const R: f64 = 6371.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_kilometers(R * c)
    }

    pub fn is_within(&self, coord: &Self, radius: Distance) -> bool {
        self.distance(coord) <= radius
    }
}

#[test]
fn distance_test() {
    let beirut = Coordinate::from((33.8938, 35.5018));
    let jounieh = Coordinate::from((33.9808, 35.6178));
    let d = beirut.distance(&jounieh);
    assert!((d.as_kilometers() - 14.3).abs() < 1.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn parse_coordinate_test() {
    let coord: Coordinate = "33.8938, 35.5018".parse().unwrap();
    assert_eq!(coord, Coordinate::from((33.8938, 35.5018)));
    assert!("33.8938".parse::<Coordinate>().is_err());
    assert!("133.0,35.0".parse::<Coordinate>().is_err());
}
