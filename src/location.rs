//! Turns a position reading into search coordinates.

use std::{future::Future, time::Duration};
use thiserror::Error;
use tokio::time;
use tracing::{info, warn};

use crate::{
    config::Config,
    models::LocationSuggestion,
    shared::{
        Prompt,
        geo::{Coordinate, Distance},
    },
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable")]
    Unavailable,
    #[error("Location request timed out")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinate: Coordinate,
    /// Radius of the reading's uncertainty.
    pub accuracy: Distance,
}

#[derive(Debug, Clone, Copy)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl From<&Config> for PositionOptions {
    fn from(config: &Config) -> Self {
        Self {
            high_accuracy: true,
            timeout: config.position_timeout,
        }
    }
}

pub trait PositionSource {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<Position, PositionError>> + Send;
}

/// A source that always reports the same reading, or the same failure.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Result<Position, PositionError>);

impl PositionSource for FixedPosition {
    async fn current_position(&self, _: PositionOptions) -> Result<Position, PositionError> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ManualReason {
    /// The user turned down a reading this imprecise.
    Imprecise(Distance),
    Failed(PositionError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acquired {
    Located(Coordinate),
    ManualEntry(ManualReason),
}

/// Reads the position once. A reading less precise than `threshold` is only
/// used if the user accepts it; otherwise, and on failure, the caller should
/// fall back to manual address entry.
pub async fn acquire<S, P>(
    source: &S,
    prompt: &P,
    options: PositionOptions,
    threshold: Distance,
) -> Acquired
where
    S: PositionSource + ?Sized,
    P: Prompt + ?Sized,
{
    let reading = match time::timeout(options.timeout, source.current_position(options)).await {
        Ok(reading) => reading,
        Err(_) => Err(PositionError::Timeout),
    };
    let position = match reading {
        Ok(position) => position,
        Err(err) => {
            warn!("Could not read position: {err}");
            return Acquired::ManualEntry(ManualReason::Failed(err));
        }
    };

    if position.accuracy > threshold {
        let question = format!(
            "Your location is only accurate to about {}. Use it anyway? (No to enter an address)",
            position.accuracy
        );
        if !prompt.confirm(&question) {
            return Acquired::ManualEntry(ManualReason::Imprecise(position.accuracy));
        }
    }
    info!("Using position {}", position.coordinate);
    Acquired::Located(position.coordinate)
}

/// Confirms coordinates from the suggestion the user picked, if any.
pub fn pick(suggestions: &[LocationSuggestion], index: usize) -> Option<(String, Coordinate)> {
    let suggestion = suggestions.get(index)?;
    let coordinate = suggestion.coordinate();
    coordinate
        .is_valid()
        .then(|| (suggestion.display_name.clone(), coordinate))
}
