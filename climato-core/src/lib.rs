//! Core library for the `climato` CLI.
//!
//! This crate defines:
//! - Position resolution: permission, geolocation, reverse geocoding,
//!   address normalization, and the last-position fallback
//! - Abstraction over the weather service and location provider
//! - Persistent position store, configuration, and shared domain models
//!
//! It is used by `climato-cli`, but can also be reused by other binaries or services.

pub mod address;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod store;

pub use config::Config;
pub use error::{LocationError, ResolveError, Stage, StoreError, WeatherError};
pub use location::{LocationProvider, system::SystemLocationProvider};
pub use model::{
    Accuracy, Address, Condition, ConditionKind, CurrentWeather, DayForecast, PermissionStatus,
    Platform, Position, RawAddress, Weather,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use resolver::{FALLBACK_POSITION, PositionResolver, PositionState};
pub use store::{PositionStore, file::FilePositionStore};
