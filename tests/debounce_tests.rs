use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use poolify::{
    geocode::{Debouncer, Error, SuggestionSource},
    models::LocationSuggestion,
};
use reqwest::StatusCode;

#[derive(Clone, Default)]
struct CountingSource {
    queries: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl SuggestionSource for CountingSource {
    async fn suggest(&self, query: String) -> Result<Vec<LocationSuggestion>, Error> {
        self.queries.lock().unwrap().push(query.clone());
        if self.fail {
            return Err(Error::Status(StatusCode::TOO_MANY_REQUESTS));
        }
        Ok(vec![LocationSuggestion {
            place_id: "1".into(),
            display_name: format!("{query}, Lebanon"),
            lat: 33.89,
            lon: 35.50,
        }])
    }
}

const DELAY: Duration = Duration::from_millis(300);

#[tokio::test(start_paused = true)]
async fn only_last_input_is_looked_up_test() {
    let source = CountingSource::default();
    let debouncer = Debouncer::new(source.clone(), DELAY, 2);

    for text in ["Ha", "Ham", "Hamr", "Hamra"] {
        debouncer.input(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(*source.queries.lock().unwrap(), ["Hamra"]);
    let latest = debouncer.latest();
    assert_eq!(latest.query, "Hamra");
    assert_eq!(latest.items[0].display_name, "Hamra, Lebanon");
}

#[tokio::test(start_paused = true)]
async fn short_query_clears_without_lookup_test() {
    let source = CountingSource::default();
    let debouncer = Debouncer::new(source.clone(), DELAY, 2);

    debouncer.input("Beirut");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(debouncer.latest().items.len(), 1);

    debouncer.input("B");
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(debouncer.latest().items.is_empty());
    assert_eq!(source.queries.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_pending_lookup_test() {
    let source = CountingSource::default();
    let debouncer = Debouncer::new(source.clone(), DELAY, 2);

    debouncer.input("Jounieh");
    debouncer.cancel();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(source.queries.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_is_reported_test() {
    let source = CountingSource {
        fail: true,
        ..Default::default()
    };
    let debouncer = Debouncer::new(source, DELAY, 2);
    let mut results = debouncer.subscribe();

    debouncer.input("Tripoli");
    results.changed().await.unwrap();
    let latest = results.borrow().clone();
    assert!(latest.items.is_empty());
    assert!(latest.error.is_some());
}
