use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::WeatherError,
    model::{Condition, CurrentWeather, DayForecast, Position, Weather},
};

use super::WeatherProvider;

const ONECALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { api_key, http })
    }

    async fn fetch_onecall(&self, position: Position) -> Result<Weather, WeatherError> {
        let res = self
            .http
            .get(ONECALL_URL)
            .query(&[
                ("lat", position.lat.to_string()),
                ("lon", position.lng.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("exclude", "minutely,hourly,alerts".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwOneCall = serde_json::from_str(&body)?;
        Ok(weather_from(parsed))
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, position: Position) -> Result<Weather, WeatherError> {
        tracing::debug!(lat = position.lat, lng = position.lng, "fetching weather");
        self.fetch_onecall(position).await
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    id: i64,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    dt: i64,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    wind_speed: f64,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct OwDaily {
    dt: i64,
    sunrise: i64,
    sunset: i64,
    temp: OwDailyTemp,
    weather: Vec<OwCondition>,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwOneCall {
    current: OwCurrent,
    daily: Vec<OwDaily>,
}

fn weather_from(parsed: OwOneCall) -> Weather {
    let observation_time = unix_to_utc(parsed.current.dt).unwrap_or_else(Utc::now);

    let current = CurrentWeather {
        temperature_c: parsed.current.temp,
        feels_like_c: parsed.current.feels_like,
        humidity_pct: parsed.current.humidity,
        wind_speed_mps: parsed.current.wind_speed,
        condition: condition_from(&parsed.current.weather),
        observation_time,
    };

    let daily = parsed
        .daily
        .into_iter()
        .map(|day| {
            let noon = unix_to_utc(day.dt).unwrap_or_else(Utc::now);
            DayForecast {
                date: noon.date_naive(),
                temp_min_c: day.temp.min,
                temp_max_c: day.temp.max,
                condition: condition_from(&day.weather),
                sunrise: unix_to_utc(day.sunrise).unwrap_or(noon),
                sunset: unix_to_utc(day.sunset).unwrap_or(noon),
                precipitation_chance_pct: pop_to_pct(day.pop),
            }
        })
        .collect();

    Weather { current, daily }
}

fn condition_from(list: &[OwCondition]) -> Condition {
    list.first().map_or_else(
        || Condition { code: 0, description: "Unknown".to_string() },
        |w| Condition { code: w.id, description: w.description.clone() },
    )
}

fn pop_to_pct(pop: Option<f64>) -> u8 {
    (pop.unwrap_or(0.0).clamp(0.0, 1.0) * 100.0).round() as u8
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
