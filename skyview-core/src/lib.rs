//! Core library for the `skyview` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Provider clients (OpenWeather for conditions/forecast/air quality/geocoding,
//!   Open-Meteo for UV) behind traits
//! - The view-state aggregator that turns triggers into one consistent,
//!   render-ready state
//! - Local persistence of favorites and recent searches
//! - Presentation helpers: condition classification, formatting, map overlays
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod format;
pub mod locator;
pub mod map;
pub mod model;
pub mod places;
pub mod provider;
pub mod state;
pub mod storage;

pub use config::{Config, Endpoints, LocatorKind};
pub use dashboard::{Dashboard, DashboardSettings};
pub use error::{FetchError, LocationError, StorageError};
pub use locator::{Locator, locator_from_config};
pub use model::{
    AirQualityIndex, Coordinates, CurrentConditions, ForecastEntry, Location, Query, Suggestion,
    UnitSystem, UvIndex,
};
pub use places::{Favorites, Recents};
pub use provider::{Providers, UvProvider, WeatherProvider};
pub use state::{Phase, ViewState};
