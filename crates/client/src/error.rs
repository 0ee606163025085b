use poolify::{account, admin, api, auth, discovery, geocode, validation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Api(#[from] api::Error),
    #[error("{0}")]
    Auth(#[from] auth::Error),
    #[error("{0}")]
    Account(#[from] account::Error),
    #[error("{0}")]
    Admin(#[from] admin::Error),
    #[error("{0}")]
    Discovery(#[from] discovery::Error),
    #[error("{0}")]
    Geocode(#[from] geocode::Error),
    #[error("{0}")]
    Invalid(#[from] validation::Error),
    #[error("Please sign in first")]
    NotSignedIn,
}
