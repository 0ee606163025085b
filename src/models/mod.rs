mod account;
mod admin;
mod chat;
mod feedback;
mod location;
mod ride;

pub use account::*;
pub use admin::*;
pub use chat::*;
pub use feedback::*;
pub use location::*;
pub use ride::*;
