use std::{path::PathBuf, time::Duration};

use crate::shared::geo::{ACCURACY_THRESHOLD, DEFAULT_SEARCH_RADIUS, Distance};

pub struct Config {
    pub api_url: String,
    pub geocoder_url: String,
    pub geocoder_key: String,
    pub accounts_path: PathBuf,
    pub search_radius: Distance,
    pub refresh_interval: Duration,
    pub clock_interval: Duration,
    pub reconcile_delay: Duration,
    pub accuracy_threshold: Distance,
    pub position_timeout: Duration,
    pub debounce_delay: Duration,
    pub min_query_len: usize,
    pub suggestion_limit: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://localhost:7221".into(),
            geocoder_url: "https://api.locationiq.com/v1".into(),
            geocoder_key: String::new(),
            accounts_path: "poolify-accounts.json".into(),
            search_radius: DEFAULT_SEARCH_RADIUS,
            refresh_interval: Duration::from_secs(2 * 60),
            clock_interval: Duration::from_secs(60),
            reconcile_delay: Duration::from_secs(1),
            accuracy_threshold: ACCURACY_THRESHOLD,
            position_timeout: Duration::from_secs(10),
            debounce_delay: Duration::from_millis(300),
            min_query_len: 2,
            suggestion_limit: 5,
            request_timeout: Duration::from_secs(15),
        }
    }
}

#[test]
fn poll_settings_from_config_test() {
    use crate::discovery::PollSettings;

    let settings = PollSettings::from(&Config::default());
    assert_eq!(settings.radius, DEFAULT_SEARCH_RADIUS);
    assert_eq!(settings.refresh_interval, Duration::from_secs(120));
    assert_eq!(settings.clock_interval, Duration::from_secs(60));
    assert_eq!(settings.reconcile_delay, Duration::from_secs(1));
}
