use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A geographic coordinate pair.
///
/// Produced by device geolocation, manual entry, or the fallback constant.
/// Immutable once captured for a resolution cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Outcome of a location permission request. Denial is a branch in the
/// resolution flow, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Positioning accuracy hint passed to the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    Low,
    High,
}

/// Field convention used by the reverse geocoder.
///
/// The two mobile geocoders this app grew up with disagree on which field
/// holds what: one reports the state under `region` as a full name and the
/// city under `city`, the other reports the city under `subregion` and
/// splits the place name across `street`/`name`. Address normalization
/// branches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Platform {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            _ => Err(anyhow::anyhow!(
                "Unknown platform '{value}'. Supported platforms: ios, android."
            )),
        }
    }
}

/// Untranslated reverse-geocode output, before platform normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAddress {
    pub city: Option<String>,
    pub street: Option<String>,
    pub name: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub iso_country_code: Option<String>,
    pub timezone: Option<String>,
}

/// Denormalized address snapshot, replaced wholesale on each resolution.
///
/// `lat`/`lng` always carry the coordinates used for the geocode lookup,
/// never the geocoder's echo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub country: Option<String>,
    pub name: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub postal_code: Option<String>,
    pub iso_country_code: Option<String>,
    pub timezone: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Weather condition as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Provider condition code (OpenWeather id).
    pub code: i64,
    pub description: String,
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        ConditionKind::from_code(self.code)
    }
}

/// Coarse condition categories mapped from OpenWeather condition codes.
/// See: https://openweathermap.org/weather-conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionKind {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl ConditionKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            200..=232 => Self::Thunderstorm,
            300..=321 => Self::Drizzle,
            500..=531 => Self::Rain,
            600..=622 => Self::Snow,
            700..=781 => Self::Fog,
            801..=802 => Self::PartlyCloudy,
            803..=804 => Self::Cloudy,
            // 800 and anything unrecognized
            _ => Self::Clear,
        }
    }

    /// Compact glyph for terminal rendering.
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁",
            Self::Fog => "🌫",
            Self::Drizzle => "🌦",
            Self::Rain => "🌧",
            Self::Snow => "❄",
            Self::Thunderstorm => "⛈",
        }
    }
}

/// Current conditions at the resolved position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    pub observation_time: DateTime<Utc>,
}

/// One day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: Condition,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub precipitation_chance_pct: u8,
}

/// Complete weather payload: current conditions plus the daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub current: CurrentWeather,
    pub daily: Vec<DayForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_code_groups() {
        assert_eq!(ConditionKind::from_code(800), ConditionKind::Clear);
        assert_eq!(ConditionKind::from_code(801), ConditionKind::PartlyCloudy);
        assert_eq!(ConditionKind::from_code(804), ConditionKind::Cloudy);
        assert_eq!(ConditionKind::from_code(741), ConditionKind::Fog);
        assert_eq!(ConditionKind::from_code(301), ConditionKind::Drizzle);
        assert_eq!(ConditionKind::from_code(502), ConditionKind::Rain);
        assert_eq!(ConditionKind::from_code(601), ConditionKind::Snow);
        assert_eq!(ConditionKind::from_code(211), ConditionKind::Thunderstorm);
    }

    #[test]
    fn unknown_condition_code_defaults_to_clear() {
        assert_eq!(ConditionKind::from_code(0), ConditionKind::Clear);
        assert_eq!(ConditionKind::from_code(999), ConditionKind::Clear);
    }

    #[test]
    fn platform_parse_roundtrip() {
        for p in [Platform::Ios, Platform::Android] {
            assert_eq!(Platform::try_from(p.as_str()).unwrap(), p);
        }
        assert!(Platform::try_from("windows").is_err());
    }
}
