//! Position resolution: permission, geolocation, reverse geocoding,
//! address normalization, weather fetch, and the last-position fallback.
//!
//! One resolver instance is constructed at startup with its collaborators
//! injected and handed to whoever renders the state. Methods take
//! `&mut self`, so a resolver cannot run two cycles at once.

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    address,
    error::{LocationError, ResolveError, Stage},
    location::LocationProvider,
    model::{Accuracy, Address, PermissionStatus, Platform, Position, Weather},
    provider::WeatherProvider,
    store::{self, PositionStore, KEY_ADDRESS, KEY_LATITUDE, KEY_LONGITUDE},
};

/// Baseline coordinate used while no live or cached position is known.
pub const FALLBACK_POSITION: Position = Position::new(-22.885639213520715, -43.33045667687955);

const PERMISSION_TIMEOUT: Duration = Duration::from_secs(60);
const POSITION_TIMEOUT: Duration = Duration::from_secs(30);
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(30);
const WEATHER_TIMEOUT: Duration = Duration::from_secs(30);
const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// State surface read by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct PositionState {
    pub loading: bool,
    /// True when a real user-derived position is in effect, false while
    /// placeholder/default data is shown.
    pub has_position: bool,
    pub address: Option<Address>,
    pub weather: Option<Weather>,
    /// Last resolution failure, for a retry affordance.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct PositionResolver {
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherProvider>,
    store: Arc<dyn PositionStore>,
    platform: Platform,
    state: PositionState,
}

impl PositionResolver {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherProvider>,
        store: Arc<dyn PositionStore>,
        platform: Platform,
    ) -> Self {
        let state = PositionState { loading: true, ..PositionState::default() };
        Self { location, weather, store, platform, state }
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Resolve from device geolocation, falling back to the stored
    /// last position (or the fallback coordinate) when permission is
    /// denied. Never writes the store.
    pub async fn resolve_automatic(&mut self) -> Result<(), ResolveError> {
        self.state.loading = true;
        let outcome = self.run_automatic().await;
        self.finish(&outcome);
        outcome
    }

    /// Resolve an explicitly entered coordinate and persist it as the
    /// last known position. A missing coordinate is a no-op.
    pub async fn resolve_manual(
        &mut self,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<(), ResolveError> {
        self.state.loading = true;
        let outcome = self.run_manual(lat, lng).await;
        self.finish(&outcome);
        outcome
    }

    /// Loading clears on every exit path; failures are kept on the state
    /// so the presentation layer can offer a retry.
    fn finish(&mut self, outcome: &Result<(), ResolveError>) {
        self.state.loading = false;
        self.state.error = match outcome {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
    }

    async fn run_automatic(&mut self) -> Result<(), ResolveError> {
        let status = stage(
            Stage::Permission,
            PERMISSION_TIMEOUT,
            self.location.request_permission(),
        )
        .await?;

        if status == PermissionStatus::Denied {
            tracing::info!("location permission denied, trying the stored position");
            return self.run_denied().await;
        }

        let position = stage(
            Stage::Position,
            POSITION_TIMEOUT,
            self.location.current_position(Accuracy::Low),
        )
        .await?;

        let weather =
            stage(Stage::Weather, WEATHER_TIMEOUT, self.weather.fetch(position)).await?;
        let address = self.geocoded_address(position).await?;

        tracing::info!(lat = position.lat, lng = position.lng, "resolved live position");
        self.state.weather = Some(weather);
        self.state.address = Some(address);
        self.state.has_position = true;
        Ok(())
    }

    async fn run_denied(&mut self) -> Result<(), ResolveError> {
        // Baseline placeholder weather, fetched before the store is
        // consulted; it becomes the state only when the cache is
        // incomplete.
        let fallback_weather =
            stage(Stage::Weather, WEATHER_TIMEOUT, self.weather.fetch(FALLBACK_POSITION)).await?;

        let cached = stage(
            Stage::Store,
            STORE_TIMEOUT,
            self.store.multi_get(&[KEY_LATITUDE, KEY_LONGITUDE, KEY_ADDRESS]),
        )
        .await?;

        if let [Some(lat), Some(lng), Some(encoded)] = &cached[..] {
            // A value that fails to parse invalidates the whole entry.
            let parsed = (lat.parse::<f64>(), lng.parse::<f64>(), store::decode_address(encoded));
            if let (Ok(lat), Ok(lng), Some(address)) = parsed {
                let position = Position::new(lat, lng);
                let weather =
                    stage(Stage::Weather, WEATHER_TIMEOUT, self.weather.fetch(position)).await?;

                tracing::info!(lat, lng, "restored stored position");
                self.state.weather = Some(weather);
                self.state.address = Some(address);
                self.state.has_position = true;
                return Ok(());
            }
            tracing::warn!("stored position is unreadable, falling back");
        }

        self.state.weather = Some(fallback_weather);
        self.state.address = None;
        self.state.has_position = false;
        Ok(())
    }

    async fn run_manual(&mut self, lat: Option<f64>, lng: Option<f64>) -> Result<(), ResolveError> {
        let (Some(lat), Some(lng)) = (lat, lng) else {
            tracing::debug!("manual resolution skipped: missing coordinate");
            return Ok(());
        };

        let position = Position::new(lat, lng);
        let weather =
            stage(Stage::Weather, WEATHER_TIMEOUT, self.weather.fetch(position)).await?;
        let address = self.geocoded_address(position).await?;

        self.state.weather = Some(weather);
        self.state.address = Some(address.clone());
        self.state.has_position = true;

        let encoded = store::encode_address(&address)?;
        stage(
            Stage::Store,
            STORE_TIMEOUT,
            self.store.multi_set(&[
                (KEY_LATITUDE, position.lat.to_string()),
                (KEY_LONGITUDE, position.lng.to_string()),
                (KEY_ADDRESS, encoded),
            ]),
        )
        .await?;

        tracing::info!(lat, lng, "resolved and stored manual position");
        Ok(())
    }

    async fn geocoded_address(&self, position: Position) -> Result<Address, ResolveError> {
        let candidates =
            stage(Stage::Geocode, GEOCODE_TIMEOUT, self.location.reverse_geocode(position)).await?;
        let raw = candidates.first().ok_or(LocationError::NoGeocodeCandidates)?;

        Ok(address::normalize(raw, self.platform, position))
    }
}

/// Await one external call with its stage timeout, tagging both the
/// timeout and the call's own failure with a [`ResolveError`] kind.
async fn stage<T, E>(
    stage: Stage,
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, ResolveError>
where
    ResolveError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ResolveError::from),
        Err(_) => Err(ResolveError::TimedOut { stage }),
    }
}
