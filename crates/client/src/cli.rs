use clap::{Parser, Subcommand};
use poolify::{
    config::Config,
    models::{Role, UserId},
    shared::geo::{Coordinate, Distance},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Backend base url.
    #[arg(long, env = "POOLIFY_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "POOLIFY_GEOCODER_URL")]
    pub geocoder_url: Option<String>,

    #[arg(long, env = "POOLIFY_GEOCODER_KEY", hide_env_values = true)]
    pub geocoder_key: Option<String>,

    /// Where accounts are kept between runs.
    #[arg(long, env = "POOLIFY_ACCOUNTS")]
    pub accounts: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long, default_value = "passenger")]
        role: Role,
        #[arg(long, default_value = "")]
        license: String,
    },
    Login {
        email: String,
        password: String,
    },
    /// List stored accounts.
    Accounts,
    /// Make a stored account the active one.
    Switch {
        id: i64,
    },
    /// Forget an account (the active one by default).
    Logout {
        id: Option<i64>,
    },
    /// Browse nearby rides and request or cancel them.
    Rides {
        /// Your position as `lat,lon`. Without it you are asked for an address.
        #[arg(long)]
        at: Option<Coordinate>,
        /// Accuracy of `--at` in meters.
        #[arg(long, default_value_t = 10.0)]
        accuracy: f64,
        /// Search radius in kilometers.
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Offer a ride (drivers only).
    Post {
        #[arg(long)]
        pickup: String,
        #[arg(long)]
        dropoff: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        seats: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        car_model: String,
        #[arg(long)]
        plate: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        comment: String,
        /// Pickup position as `lat,lon`.
        #[arg(long)]
        at: Option<Coordinate>,
    },
    /// Requests passengers made on your rides.
    Requests,
    /// Verify drivers (admins only).
    Admin {
        #[command(subcommand)]
        action: Option<AdminAction>,
    },
    /// Read or leave feedback.
    Feedback {
        /// Leave this comment instead of listing.
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value_t = 5)]
        rate: u8,
        #[arg(long, default_value = "")]
        author: String,
    },
    /// Look up addresses.
    Search {
        query: String,
    },
    /// List chats, or chat about a ride.
    Chat {
        ride: Option<i64>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum AdminAction {
    Approve { id: UserId },
    Reject { id: UserId },
}

impl Args {
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(url) = &self.geocoder_url {
            config.geocoder_url = url.clone();
        }
        if let Some(key) = &self.geocoder_key {
            config.geocoder_key = key.clone();
        }
        if let Some(path) = &self.accounts {
            config.accounts_path = path.clone();
        }
        if let Command::Rides {
            radius: Some(radius),
            ..
        } = self.command
        {
            config.search_radius = Distance::from_kilometers(radius);
        }
        config
    }
}
