//! One-shot resolution of the current position.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config,
    config::LocatorKind,
    error::LocationError,
    model::Coordinates,
};

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Always reports that no position is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocator;

#[async_trait]
impl Locator for DisabledLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable("geolocation disabled".to_string()))
    }
}

/// Approximate position of the public IP address, via an ip-api style service.
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl IpLocator {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string(), http: Client::new() }
    }

    pub fn with_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::PermissionDenied);
            }
            status if !status.is_success() => {
                return Err(LocationError::Unavailable(format!("locator returned {status}")));
            }
            _ => {}
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(format!("unreadable locator response: {e}")))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                tracing::info!("Located at {lat}, {lon}");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "no position in locator response".to_string()),
            )),
        }
    }
}

/// Build the locator selected by `config.locator`.
pub fn locator_from_config(config: &Config) -> anyhow::Result<Box<dyn Locator>> {
    let locator: Box<dyn Locator> = match config.locator {
        LocatorKind::Ip => Box::new(
            IpLocator::new(&config.endpoints.geolocation_url).with_client(config.http_client()?),
        ),
        LocatorKind::Fixed => {
            let coordinates = config.fixed_coordinates().ok_or_else(|| {
                anyhow::anyhow!(
                    "Locator 'fixed' needs both fixed_latitude and fixed_longitude.\n\
                     Hint: set them in {}.",
                    Config::config_file_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })?;
            Box::new(FixedLocator(coordinates))
        }
        LocatorKind::Off => Box::new(DisabledLocator),
    };

    Ok(locator)
}
