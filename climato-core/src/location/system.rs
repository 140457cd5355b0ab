//! Geolocation for a machine without a GPS: position from an IP lookup,
//! addresses from Nominatim (OpenStreetMap; free, no API key required).

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    error::LocationError,
    model::{Accuracy, PermissionStatus, Position, RawAddress},
};

use super::LocationProvider;

const IP_API_URL: &str = "http://ip-api.com/json/";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const REQUEST_TIMEOUT_SECS: u64 = 10;
// Nominatim rejects requests without an identifying agent.
const USER_AGENT: &str = "climato/0.1.0 (https://github.com/climato)";

#[derive(Debug, Clone)]
pub struct SystemLocationProvider {
    http: Client,
    permission: PermissionStatus,
}

impl SystemLocationProvider {
    /// `permission` is the user's consent decision, captured up front by
    /// the caller (the CLI asks before constructing the provider).
    pub fn new(permission: PermissionStatus) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, permission })
    }
}

#[async_trait::async_trait]
impl LocationProvider for SystemLocationProvider {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError> {
        Ok(self.permission)
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Position, LocationError> {
        // IP geolocation has a single accuracy tier; the hint is accepted
        // for interface parity with real positioning hardware.
        let res = self.http.get(IP_API_URL).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(LocationError::Status { status: status.as_u16(), body });
        }

        let parsed: IpApiResponse = serde_json::from_str(&body)?;

        if parsed.status != "success" {
            return Err(LocationError::PositionUnavailable(
                parsed.message.unwrap_or_else(|| "IP lookup failed".to_string()),
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!(lat, lon, "positioned via IP lookup");
                Ok(Position::new(lat, lon))
            }
            _ => Err(LocationError::PositionUnavailable(
                "IP lookup returned no coordinates".to_string(),
            )),
        }
    }

    async fn reverse_geocode(&self, position: Position) -> Result<Vec<RawAddress>, LocationError> {
        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&zoom=18",
            NOMINATIM_URL, position.lat, position.lng
        );

        let res = self.http.get(&url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(LocationError::Status { status: status.as_u16(), body });
        }

        let parsed: NominatimResponse = serde_json::from_str(&body)?;
        Ok(raw_addresses_from(parsed))
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    name: Option<String>,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

/// Map a Nominatim response onto the geocoder-neutral [`RawAddress`]
/// shape the normalizer understands.
fn raw_addresses_from(resp: NominatimResponse) -> Vec<RawAddress> {
    let Some(addr) = resp.address else {
        return Vec::new();
    };

    let name = resp
        .name
        .filter(|n| !n.is_empty())
        .or_else(|| {
            resp.display_name
                .as_deref()
                .and_then(|d| d.split(',').next())
                .map(str::to_string)
        });

    let raw = RawAddress {
        city: addr.city.or(addr.town).or(addr.village).or(addr.municipality),
        street: addr.road,
        name,
        district: addr.neighbourhood.or(addr.suburb),
        region: addr.state,
        subregion: addr.county,
        country: addr.country,
        postal_code: addr.postcode,
        iso_country_code: addr.country_code.map(|c| c.to_uppercase()),
        timezone: None,
    };

    vec![raw]
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMINATIM_SAMPLE: &str = r#"{
        "name": "MASP",
        "display_name": "MASP, Avenida Paulista, Bela Vista, São Paulo, Brasil",
        "address": {
            "road": "Avenida Paulista",
            "suburb": "Bela Vista",
            "city": "São Paulo",
            "county": "Região Metropolitana de São Paulo",
            "state": "São Paulo",
            "postcode": "01310-200",
            "country": "Brasil",
            "country_code": "br"
        }
    }"#;

    #[test]
    fn maps_nominatim_fields() {
        let parsed: NominatimResponse = serde_json::from_str(NOMINATIM_SAMPLE).unwrap();
        let raws = raw_addresses_from(parsed);
        assert_eq!(raws.len(), 1);

        let raw = &raws[0];
        assert_eq!(raw.city.as_deref(), Some("São Paulo"));
        assert_eq!(raw.street.as_deref(), Some("Avenida Paulista"));
        assert_eq!(raw.district.as_deref(), Some("Bela Vista"));
        assert_eq!(raw.region.as_deref(), Some("São Paulo"));
        assert_eq!(raw.subregion.as_deref(), Some("Região Metropolitana de São Paulo"));
        assert_eq!(raw.iso_country_code.as_deref(), Some("BR"));
        assert_eq!(raw.name.as_deref(), Some("MASP"));
        assert!(raw.timezone.is_none());
    }

    #[test]
    fn falls_back_to_display_name_head() {
        let parsed: NominatimResponse = serde_json::from_str(
            r#"{"display_name": "Centro, Rio de Janeiro", "address": {"city": "Rio de Janeiro"}}"#,
        )
        .unwrap();
        let raws = raw_addresses_from(parsed);
        assert_eq!(raws[0].name.as_deref(), Some("Centro"));
    }

    #[test]
    fn no_address_means_no_candidates() {
        let parsed: NominatimResponse =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).unwrap();
        assert!(raw_addresses_from(parsed).is_empty());
    }

    #[test]
    fn ip_api_failure_payload_parses() {
        let parsed: IpApiResponse =
            serde_json::from_str(r#"{"status": "fail", "message": "private range"}"#).unwrap();
        assert_eq!(parsed.status, "fail");
        assert_eq!(parsed.message.as_deref(), Some("private range"));
    }
}
