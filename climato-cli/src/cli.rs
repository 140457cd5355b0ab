use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use climato_core::{
    Config, FilePositionStore, PermissionStatus, Platform, PositionResolver, PositionState,
    SystemLocationProvider, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "climato", version, about = "Weather for where you are")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather API key and address field convention.
    Configure,

    /// Show current conditions for your detected (or last known) position.
    Now,

    /// Show current conditions for an explicit coordinate.
    At {
        /// Latitude in decimal degrees.
        lat: f64,
        /// Longitude in decimal degrees.
        lng: f64,
    },

    /// Show the daily forecast for your detected (or last known) position.
    Forecast,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Now => {
                let mut resolver = build_resolver(ask_consent())?;
                resolver.resolve_automatic().await?;
                render_current(resolver.state());
                Ok(())
            }
            Command::At { lat, lng } => {
                // The manual path never asks for geolocation.
                let mut resolver = build_resolver(PermissionStatus::Denied)?;
                resolver.resolve_manual(Some(lat), Some(lng)).await?;
                render_current(resolver.state());
                Ok(())
            }
            Command::Forecast => {
                let mut resolver = build_resolver(ask_consent())?;
                resolver.resolve_automatic().await?;
                render_forecast(resolver.state());
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:")
        .with_help_message("https://openweathermap.org/api")
        .prompt()?;
    config.set_api_key(api_key.trim().to_string());

    let platform = inquire::Select::new(
        "Address field convention:",
        vec![Platform::Ios, Platform::Android],
    )
    .prompt()?;
    config.set_platform(platform);

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}

/// Ask for location consent up front; the resolver sees the answer as the
/// permission status. Declining, or running without a terminal, means
/// denied.
fn ask_consent() -> PermissionStatus {
    let answer =
        inquire::Confirm::new("Allow climato to detect your location via your IP address?")
            .with_default(true)
            .prompt();

    match answer {
        Ok(true) => PermissionStatus::Granted,
        _ => PermissionStatus::Denied,
    }
}

fn build_resolver(permission: PermissionStatus) -> Result<PositionResolver> {
    let config = Config::load()?;
    let weather = provider_from_config(&config)?;
    let location = Arc::new(SystemLocationProvider::new(permission)?);
    let store = Arc::new(FilePositionStore::new()?);

    Ok(PositionResolver::new(location, weather, store, config.platform()?))
}

fn render_current(state: &PositionState) {
    let Some(weather) = &state.weather else {
        println!("No weather data available.");
        return;
    };

    println!("{}", location_line(state));
    if !state.has_position {
        println!("(no position available — showing the default area)");
    }

    let current = &weather.current;
    println!(
        "{} {:.0}°C (feels like {:.0}°C) — {}",
        current.condition.kind().glyph(),
        current.temperature_c,
        current.feels_like_c,
        current.condition.description
    );
    println!(
        "humidity {}%  wind {:.1} m/s  observed {}",
        current.humidity_pct,
        current.wind_speed_mps,
        current.observation_time.format("%H:%M UTC")
    );
}

fn render_forecast(state: &PositionState) {
    render_current(state);

    let Some(weather) = &state.weather else { return };
    if weather.daily.is_empty() {
        return;
    }

    println!();
    for day in &weather.daily {
        println!(
            "{}  {} {:>3.0}° / {:<3.0}°  {:>3}% rain  {}",
            day.date.format("%a %d %b"),
            day.condition.kind().glyph(),
            day.temp_max_c,
            day.temp_min_c,
            day.precipitation_chance_pct,
            day.condition.description
        );
    }
}

fn location_line(state: &PositionState) -> String {
    let Some(address) = &state.address else {
        return "Somewhere (location unknown)".to_string();
    };

    let mut parts: Vec<&str> = Vec::new();
    if let Some(neighborhood) = address.neighborhood.as_deref() {
        parts.push(neighborhood);
    }
    if let Some(city) = address.city.as_deref() {
        parts.push(city);
    }
    if let Some(state_name) = address.state.as_deref() {
        parts.push(state_name);
    }
    if parts.is_empty() {
        if let Some(country) = address.country.as_deref() {
            parts.push(country);
        }
    }

    if parts.is_empty() {
        format!("{:.4}, {:.4}", address.lat, address.lng)
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climato_core::Address;

    #[test]
    fn location_line_prefers_named_places() {
        let state = PositionState {
            address: Some(Address {
                neighborhood: Some("Bela Vista".to_string()),
                city: Some("São Paulo".to_string()),
                state: Some("SP".to_string()),
                lat: -23.5,
                lng: -46.6,
                ..Address::default()
            }),
            ..PositionState::default()
        };

        assert_eq!(location_line(&state), "Bela Vista, São Paulo, SP");
    }

    #[test]
    fn location_line_falls_back_to_coordinates() {
        let state = PositionState {
            address: Some(Address { lat: -23.5, lng: -46.6, ..Address::default() }),
            ..PositionState::default()
        };

        assert_eq!(location_line(&state), "-23.5000, -46.6000");
    }
}
