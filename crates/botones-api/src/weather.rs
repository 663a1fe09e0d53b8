//! Geocoding and current conditions via open-meteo.

use crate::{
    client::ApiClient,
    error::{ApiError, Result},
};
use serde::Deserialize;
use tracing::debug;

const GEOCODE_ENDPOINT: &str = "open-meteo geocoding";
const FORECAST_ENDPOINT: &str = "open-meteo forecast";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    // Absent entirely when nothing matches, hence the default.
    #[serde(default)]
    results: Vec<GeoHit>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeoHit {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    wind_speed_10m: f64,
    weather_code: u8,
}

/// Assembled current-conditions snapshot for one resolved place.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub place: String,
    pub description: &'static str,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: f64,
    pub wind_kmh: f64,
}

impl ApiClient {
    /// Resolve `place` to coordinates, then fetch current conditions.
    ///
    /// An unknown place is a [`ApiError::NoMatch`], distinct from transport
    /// failures so the caller can phrase it as a plain negative result.
    pub async fn weather(&self, place: &str) -> Result<WeatherReport> {
        let url = format!(
            "https://geocoding-api.open-meteo.com/v1/search?name={}&count=1&language=en&format=json",
            urlencoding::encode(place)
        );
        let geo: GeocodeResponse = self.get_json(GEOCODE_ENDPOINT, &url).await?;
        let hit = geo
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NoMatch {
                what: format!("no place found matching \"{place}\""),
            })?;
        debug!(name = %hit.name, lat = hit.latitude, lon = hit.longitude, "geocoded");

        let url = format!(
            "https://api.open-meteo.com/v1/forecast?latitude={}&longitude={}\
             &current=temperature_2m,relative_humidity_2m,apparent_temperature,wind_speed_10m,weather_code",
            hit.latitude, hit.longitude
        );
        let forecast: ForecastResponse = self.get_json(FORECAST_ENDPOINT, &url).await?;
        let current = forecast.current;

        let place = match (&hit.admin1, &hit.country) {
            (Some(region), Some(country)) => format!("{}, {region} ({country})", hit.name),
            (None, Some(country)) => format!("{}, {country}", hit.name),
            _ => hit.name.clone(),
        };

        Ok(WeatherReport {
            place,
            description: weather_code_description(current.weather_code),
            temperature_c: current.temperature_2m,
            feels_like_c: current.apparent_temperature,
            humidity_pct: current.relative_humidity_2m,
            wind_kmh: current.wind_speed_10m,
        })
    }
}

/// Short human label for a WMO weather interpretation code.
pub fn weather_code_description(code: u8) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 | 48 => "fog",
        51 | 53 | 55 => "drizzle",
        56 | 57 => "freezing drizzle",
        61 | 63 | 65 => "rain",
        66 | 67 => "freezing rain",
        71 | 73 | 75 => "snowfall",
        77 => "snow grains",
        80 | 81 | 82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_response_parses_hits() {
        let json = r#"{
            "results": [
                {"name": "Madrid", "latitude": 40.4165, "longitude": -3.7026,
                 "country": "Spain", "admin1": "Madrid"}
            ],
            "generationtime_ms": 0.5
        }"#;
        let parsed: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].name, "Madrid");
        assert_eq!(parsed.results[0].country.as_deref(), Some("Spain"));
    }

    #[test]
    fn geocode_response_with_no_results_is_empty() {
        // open-meteo omits the results key entirely on a miss.
        let parsed: GeocodeResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.3}"#).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn forecast_response_parses_current_block() {
        let json = r#"{
            "latitude": 40.4, "longitude": -3.7,
            "current_units": {"temperature_2m": "°C"},
            "current": {
                "time": "2025-06-01T12:00",
                "temperature_2m": 28.3,
                "relative_humidity_2m": 31,
                "apparent_temperature": 27.1,
                "wind_speed_10m": 14.2,
                "weather_code": 2
            }
        }"#;
        let parsed: ForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.current.weather_code, 2);
        assert_eq!(parsed.current.relative_humidity_2m, 31.0);
    }

    #[test]
    fn weather_codes_map_to_labels() {
        assert_eq!(weather_code_description(0), "clear sky");
        assert_eq!(weather_code_description(3), "overcast");
        assert_eq!(weather_code_description(48), "fog");
        assert_eq!(weather_code_description(63), "rain");
        assert_eq!(weather_code_description(82), "rain showers");
        assert_eq!(weather_code_description(99), "thunderstorm with hail");
        assert_eq!(weather_code_description(42), "unknown conditions");
    }
}
