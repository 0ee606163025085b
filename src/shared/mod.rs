pub mod geo;
pub mod time;

pub use geo::*;
pub use time::*;

/// Blocking yes/no question put to the user.
pub trait Prompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Prompt for FixedAnswer {
    fn confirm(&self, _: &str) -> bool {
        self.0
    }
}
