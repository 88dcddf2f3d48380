use crate::{
    Config,
    error::FetchError,
    model::{AirQualityIndex, Coordinates, CurrentConditions, ForecastEntry, Suggestion, UnitSystem, UvIndex},
    provider::{openmeteo::OpenMeteoUvProvider, openweather::OpenWeatherProvider},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openmeteo;
pub mod openweather;

/// Main weather provider: conditions, forecast, air quality and geocoding.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_by_coordinates(
        &self,
        coordinates: Coordinates,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, FetchError>;

    /// Ambiguous names resolve to the provider's first match.
    async fn current_by_name(
        &self,
        name: &str,
        unit: UnitSystem,
    ) -> Result<CurrentConditions, FetchError>;

    /// Raw 3-hour series; slicing into views is up to the caller.
    async fn forecast(
        &self,
        coordinates: Coordinates,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, FetchError>;

    /// `None` on any failure.
    async fn air_quality(&self, coordinates: Coordinates) -> Option<AirQualityIndex>;

    /// Empty on any failure.
    async fn suggestions(&self, partial_name: &str) -> Vec<Suggestion>;
}

/// UV index source, hosted separately from the main provider.
#[async_trait]
pub trait UvProvider: Send + Sync + Debug {
    /// `None` on any failure.
    async fn uv_index(&self, coordinates: Coordinates) -> Option<UvIndex>;
}

#[derive(Debug, Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherProvider>,
    pub uv: Arc<dyn UvProvider>,
}

/// Construct both providers from config.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Providers> {
    let api_key = config.api_key()?;
    let http = config.http_client()?;

    let weather = OpenWeatherProvider::new(api_key, &config.endpoints.weather_base_url)
        .with_client(http.clone());
    let uv = OpenMeteoUvProvider::new(&config.endpoints.uv_base_url).with_client(http);

    Ok(Providers {
        weather: Arc::new(weather),
        uv: Arc::new(uv),
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
