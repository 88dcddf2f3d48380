use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    error::FetchError,
    model::{AirQualityIndex, Coordinates, CurrentConditions, ForecastEntry, Suggestion, UnitSystem},
    provider::truncate_body,
};

use super::WeatherProvider;

/// Candidates requested from the geocoding endpoint.
pub const SUGGESTION_LIMIT: u8 = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, what, "OpenWeather request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                FetchError::Network(format!("Failed to send request to OpenWeather ({what}): {e}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::Network(format!("Failed to read OpenWeather {what} response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::NotFound(provider_message(&body).unwrap_or_else(|| {
                format!(
                    "OpenWeather {what} request failed with status {status}: {}",
                    truncate_body(&body)
                )
            })));
        }

        // The provider sometimes reports failure in `cod` with a 200 status.
        if let Some(code) = status_code(&body).filter(|c| *c != 200) {
            return Err(FetchError::NotFound(
                provider_message(&body).unwrap_or_else(|| format!("OpenWeather {what} code {code}")),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            FetchError::Provider(format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }

    async fn fetch_current(
        &self,
        mut query: Vec<(&'static str, String)>,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, FetchError> {
        query.push(("units", unit.as_str().to_string()));
        let parsed: OwCurrentResponse = self.get("/data/2.5/weather", &query, "current weather").await?;
        Ok(parsed.into_conditions())
    }
}

fn coordinate_query(c: Coordinates) -> Vec<(&'static str, String)> {
    vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
}

/// Top-level field of a JSON object body; `None` for arrays or invalid JSON.
fn body_field(body: &str, field: &str) -> Option<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get(field).cloned()
}

fn status_code(body: &str) -> Option<i64> {
    match body_field(body, "cod")? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn provider_message(body: &str) -> Option<String> {
    match body_field(body, "message")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: Option<OwSys>,
    #[serde(default)]
    timezone: i32,
}

impl OwCurrentResponse {
    fn into_conditions(self) -> CurrentConditions {
        let description = first_description(&self.weather);
        let (sunrise, sunset) = match &self.sys {
            Some(sys) => (
                sys.sunrise.and_then(unix_to_utc),
                sys.sunset.and_then(unix_to_utc),
            ),
            None => (None, None),
        };

        CurrentConditions {
            location_name: self.name,
            temperature: self.main.temp,
            feels_like: self.main.feels_like.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_direction_deg: self.wind.deg,
            description,
            sunrise,
            sunset,
            timezone_offset_secs: self.timezone,
            coordinates: Coordinates::new(self.coord.lat, self.coord.lon),
            observation_time: unix_to_utc(self.dt).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAirMain {
    aqi: u8,
}

#[derive(Debug, Deserialize)]
struct OwAirEntry {
    main: OwAirMain,
}

#[derive(Debug, Deserialize)]
struct OwAirResponse {
    list: Vec<OwAirEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    #[serde(default)]
    country: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, FetchError> {
        self.fetch_current(coordinate_query(coordinates), unit).await
    }

    async fn current_by_name(
        &self,
        name: &str,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, FetchError> {
        self.fetch_current(vec![("q", name.to_string())], unit).await
    }

    async fn forecast(
        &self,
        coordinates: Coordinates,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, FetchError> {
        let mut query = coordinate_query(coordinates);
        query.push(("units", unit.as_str().to_string()));
        let parsed: OwForecastResponse = self.get("/data/2.5/forecast", &query, "forecast").await?;

        Ok(parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                Some(ForecastEntry {
                    timestamp: unix_to_utc(entry.dt)?,
                    temperature: entry.main.temp,
                    humidity_pct: entry.main.humidity,
                    description: first_description(&entry.weather),
                })
            })
            .collect())
    }

    async fn air_quality(&self, coordinates: Coordinates) -> Option<AirQualityIndex> {
        let query = coordinate_query(coordinates);
        match self
            .get::<OwAirResponse>("/data/2.5/air_pollution", &query, "air pollution")
            .await
        {
            Ok(parsed) => parsed.list.first().and_then(|e| AirQualityIndex::new(e.main.aqi)),
            Err(err) => {
                tracing::warn!("Air quality unavailable: {err}");
                None
            }
        }
    }

    async fn suggestions(&self, partial_name: &str) -> Vec<Suggestion> {
        let query = [
            ("q", partial_name.to_string()),
            ("limit", SUGGESTION_LIMIT.to_string()),
        ];
        match self.get::<Vec<OwGeoEntry>>("/geo/1.0/direct", &query, "geocoding").await {
            Ok(entries) => entries
                .into_iter()
                .map(|e| Suggestion { name: e.name, country: e.country })
                .collect(),
            Err(err) => {
                tracing::warn!("Suggestions unavailable for '{partial_name}': {err}");
                Vec::new()
            }
        }
    }
}

fn first_description(weather: &[OwWeather]) -> String {
    weather
        .first()
        .map(|w| w.description.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}
