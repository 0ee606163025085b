//! Client for the Poolify carpooling backend.
//!
//! The heart of the crate is [`discovery::Poller`], which keeps the list of
//! nearby rides and the user's own requests fresh and derives, per ride, what
//! the user can do with it. Around it sit thin typed wrappers for accounts,
//! ride posting, driver verification, feedback and geocoding.

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod discovery;
pub mod geocode;
pub mod location;
pub mod models;
pub mod shared;
pub mod validation;

pub mod prelude {
    pub use crate::account::AccountStore;
    pub use crate::api::ApiClient;
    pub use crate::config::Config;
    pub use crate::discovery::{DiscoveryState, PollSettings, Poller, RideAction, RideBackend};
    pub use crate::geocode::{Debouncer, GeocodeClient, SuggestionSource};
    pub use crate::models::*;
    pub use crate::shared::{Coordinate, Distance, Prompt};
}
