//! Address normalization shared by the automatic and manual resolution
//! paths. The rule is written exactly once here.

use crate::model::{Address, Platform, Position, RawAddress};

/// Region full names and their postal abbreviations, as the geocoder's
/// iOS-like variant expects them converted. Covers the Brazilian states
/// the app was built for plus the US states.
const STATES: &[(&str, &str)] = &[
    // Brazil
    ("Acre", "AC"),
    ("Alagoas", "AL"),
    ("Amapá", "AP"),
    ("Amazonas", "AM"),
    ("Bahia", "BA"),
    ("Ceará", "CE"),
    ("Distrito Federal", "DF"),
    ("Espírito Santo", "ES"),
    ("Goiás", "GO"),
    ("Maranhão", "MA"),
    ("Mato Grosso", "MT"),
    ("Mato Grosso do Sul", "MS"),
    ("Minas Gerais", "MG"),
    ("Pará", "PA"),
    ("Paraíba", "PB"),
    ("Paraná", "PR"),
    ("Pernambuco", "PE"),
    ("Piauí", "PI"),
    ("Rio de Janeiro", "RJ"),
    ("Rio Grande do Norte", "RN"),
    ("Rio Grande do Sul", "RS"),
    ("Rondônia", "RO"),
    ("Roraima", "RR"),
    ("Santa Catarina", "SC"),
    ("São Paulo", "SP"),
    ("Sergipe", "SE"),
    ("Tocantins", "TO"),
    // United States
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Convert a full region name to its postal abbreviation.
/// Unknown regions pass through unchanged.
pub fn convert_state(region: &str) -> String {
    STATES
        .iter()
        .find(|(name, _)| *name == region)
        .map_or_else(|| region.to_string(), |(_, abbr)| (*abbr).to_string())
}

/// Build the denormalized [`Address`] from a raw reverse-geocode candidate.
///
/// - `state`: converted region on iOS, raw region on Android, unset when
///   the region is empty;
/// - `city`: `subregion` on Android, raw `city` on iOS;
/// - `neighborhood`: always the raw `district`;
/// - `name`: `"{street} - {name}"` on Android, raw `name` on iOS;
/// - `lat`/`lng`: the lookup coordinates, never the geocoder echo;
/// - everything else passes through.
pub fn normalize(raw: &RawAddress, platform: Platform, lookup: Position) -> Address {
    let state = raw
        .region
        .as_deref()
        .filter(|region| !region.is_empty())
        .map(|region| match platform {
            Platform::Ios => convert_state(region),
            Platform::Android => region.to_string(),
        });

    let city = match platform {
        Platform::Android => raw.subregion.clone(),
        Platform::Ios => raw.city.clone(),
    };

    let name = match platform {
        Platform::Android => match (raw.street.as_deref(), raw.name.as_deref()) {
            (Some(street), Some(name)) => Some(format!("{street} - {name}")),
            (Some(street), None) => Some(street.to_string()),
            (None, name) => name.map(str::to_string),
        },
        Platform::Ios => raw.name.clone(),
    };

    Address {
        state,
        city,
        neighborhood: raw.district.clone(),
        street: raw.street.clone(),
        country: raw.country.clone(),
        name,
        district: raw.district.clone(),
        region: raw.region.clone(),
        subregion: raw.subregion.clone(),
        postal_code: raw.postal_code.clone(),
        iso_country_code: raw.iso_country_code.clone(),
        timezone: raw.timezone.clone(),
        lat: lookup.lat,
        lng: lookup.lng,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_california() -> RawAddress {
        RawAddress {
            city: Some("San Francisco".to_string()),
            street: Some("Market St".to_string()),
            name: Some("1 Market St".to_string()),
            district: Some("Financial District".to_string()),
            region: Some("California".to_string()),
            subregion: Some("San Francisco County".to_string()),
            country: Some("United States".to_string()),
            ..RawAddress::default()
        }
    }

    #[test]
    fn ios_converts_region_and_keeps_city() {
        let addr = normalize(&raw_california(), Platform::Ios, Position::new(37.77, -122.42));

        assert_eq!(addr.state.as_deref(), Some("CA"));
        assert_eq!(addr.city.as_deref(), Some("San Francisco"));
        assert_eq!(addr.name.as_deref(), Some("1 Market St"));
    }

    #[test]
    fn android_passes_region_through_and_substitutes_subregion() {
        let addr = normalize(&raw_california(), Platform::Android, Position::new(37.77, -122.42));

        assert_eq!(addr.state.as_deref(), Some("California"));
        assert_eq!(addr.city.as_deref(), Some("San Francisco County"));
        assert_eq!(addr.name.as_deref(), Some("Market St - 1 Market St"));
    }

    #[test]
    fn empty_region_leaves_state_unset() {
        let raw = RawAddress { region: Some(String::new()), ..RawAddress::default() };
        let addr = normalize(&raw, Platform::Ios, Position::new(0.0, 0.0));
        assert!(addr.state.is_none());

        let raw = RawAddress::default();
        let addr = normalize(&raw, Platform::Android, Position::new(0.0, 0.0));
        assert!(addr.state.is_none());
    }

    #[test]
    fn neighborhood_is_always_the_district() {
        let addr = normalize(&raw_california(), Platform::Ios, Position::new(37.77, -122.42));
        assert_eq!(addr.neighborhood.as_deref(), Some("Financial District"));
        assert_eq!(addr.district.as_deref(), Some("Financial District"));
    }

    #[test]
    fn lookup_coordinates_win_over_geocoder_echo() {
        let lookup = Position::new(-23.5, -46.6);
        let addr = normalize(&raw_california(), Platform::Android, lookup);
        assert_eq!(addr.lat, -23.5);
        assert_eq!(addr.lng, -46.6);
    }

    #[test]
    fn convert_state_handles_both_countries() {
        assert_eq!(convert_state("São Paulo"), "SP");
        assert_eq!(convert_state("California"), "CA");
        assert_eq!(convert_state("Bavaria"), "Bavaria");
    }
}
