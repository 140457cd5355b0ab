//! Tagged error taxonomy for the resolution flow.
//!
//! Every external-call failure (geolocation, geocoding, weather fetch,
//! store) is converted into a typed kind the presentation layer can act
//! on, instead of an opaque rejection that leaves the UI hanging.

use thiserror::Error;

/// Geolocation / geocoding provider failures.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("location service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not determine a position: {0}")]
    PositionUnavailable(String),

    #[error("reverse geocoding produced no candidates")]
    NoGeocodeCandidates,

    #[error("failed to decode location payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Weather service failures.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode weather payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Persistent position store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not determine platform cache directory")]
    NoProjectDirs,

    #[error("failed to access position store: {0}")]
    Io(#[from] std::io::Error),

    #[error("position store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The awaited step a resolution cycle was in when it failed or timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Permission,
    Position,
    Geocode,
    Weather,
    Store,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Permission => "permission",
            Stage::Position => "position",
            Stage::Geocode => "geocode",
            Stage::Weather => "weather",
            Stage::Store => "store",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level resolution failure, one kind per collaborator plus timeouts.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("location error: {0}")]
    Location(#[from] LocationError),

    #[error("weather error: {0}")]
    Weather(#[from] WeatherError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("timed out waiting for {stage}")]
    TimedOut { stage: Stage },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_out_message_names_the_stage() {
        let err = ResolveError::TimedOut { stage: Stage::Geocode };
        assert_eq!(err.to_string(), "timed out waiting for geocode");
    }
}
