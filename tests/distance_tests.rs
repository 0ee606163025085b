use poolify::shared::geo::{Coordinate, DEFAULT_SEARCH_RADIUS, Distance};

#[test]
fn within_radius_test() {
    let hamra = Coordinate::from((33.8966, 35.4823));
    let achrafieh = Coordinate::from((33.8869, 35.5195));
    let byblos = Coordinate::from((34.1230, 35.6519));
    assert!(hamra.is_within(&achrafieh, DEFAULT_SEARCH_RADIUS));
    assert!(!hamra.is_within(&byblos, DEFAULT_SEARCH_RADIUS));
}

#[test]
fn distance_display_test() {
    assert_eq!(Distance::from_meters(85.4).to_string(), "85 m");
    assert_eq!(Distance::from_kilometers(4.26).to_string(), "4.3 km");
}

#[test]
fn distance_add_test() {
    let total = Distance::from_meters(500.0) + Distance::from_kilometers(1.0);
    assert_eq!(total.as_meters(), 1500.0);
}

#[test]
fn coordinate_round_trip_test() {
    let at = Coordinate::from((33.8938, 35.5018));
    let (lat, lon): (f64, f64) = at.into();
    assert_eq!((lat, lon), (33.8938, 35.5018));
    assert_eq!(at.to_string().parse::<Coordinate>().unwrap(), at);
}
