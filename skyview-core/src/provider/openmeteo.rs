use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, UvIndex},
    provider::truncate_body,
};

use super::UvProvider;

/// UV index from Open-Meteo. No API key is needed.
#[derive(Debug, Clone)]
pub struct OpenMeteoUvProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoUvProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn fetch(&self, coordinates: Coordinates) -> Result<Option<f64>, String> {
        let url = format!("{}/v1/forecast", self.base_url);
        tracing::debug!(%url, "Open-Meteo UV request");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", "uv_index".to_string()),
            ])
            .send()
            .await
            .map_err(|e| format!("Failed to send request to Open-Meteo: {e}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| format!("Failed to read Open-Meteo response body: {e}"))?;

        if !status.is_success() {
            return Err(format!(
                "Open-Meteo request failed with status {status}: {}",
                truncate_body(&body)
            ));
        }

        let parsed: OmResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse Open-Meteo JSON: {e}"))?;

        Ok(parsed.current.and_then(|c| c.uv_index))
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    uv_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: Option<OmCurrent>,
}

#[async_trait]
impl UvProvider for OpenMeteoUvProvider {
    async fn uv_index(&self, coordinates: Coordinates) -> Option<UvIndex> {
        match self.fetch(coordinates).await {
            Ok(Some(value)) if value.is_finite() && value >= 0.0 => Some(UvIndex(value)),
            Ok(_) => {
                tracing::debug!("Open-Meteo response carried no usable UV index");
                None
            }
            Err(err) => {
                tracing::warn!("UV index unavailable: {err}");
                None
            }
        }
    }
}
