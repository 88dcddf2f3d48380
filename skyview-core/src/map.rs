//! Map overlay descriptors for a location.
//!
//! Layers are listed bottom to top: base map, live radar, then the provider's
//! temperature and wind overlays. Each carries the URL of the Web Mercator
//! tile that contains the location at the requested zoom.

use std::f64::consts::PI;

use crate::model::Location;

pub const DEFAULT_ZOOM: u8 = 7;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

const OSM_TILES: &str = "https://tile.openstreetmap.org";
const RAINVIEWER_TILES: &str = "https://tile.rainviewer.com/v1/radar/now";

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: &'static str,
    pub url: String,
    pub z_index: u8,
    pub opacity: f32,
    pub attribution: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// Slippy-map tile containing the given point.
pub fn tile_for(latitude: f64, longitude: f64, zoom: u8) -> Tile {
    let n = f64::from(1u32 << zoom.min(30));
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let lon = longitude.clamp(-180.0, 180.0);

    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
    let max = n - 1.0;

    Tile {
        zoom,
        x: x.clamp(0.0, max) as u32,
        y: y.clamp(0.0, max) as u32,
    }
}

pub fn overlay_layers(
    location: &Location,
    zoom: u8,
    provider_tile_base: &str,
    api_key: &str,
) -> Vec<TileLayer> {
    let Tile { zoom, x, y } = tile_for(location.latitude, location.longitude, zoom);
    let provider_base = provider_tile_base.trim_end_matches('/');

    vec![
        TileLayer {
            name: "base",
            url: format!("{OSM_TILES}/{zoom}/{x}/{y}.png"),
            z_index: 1,
            opacity: 1.0,
            attribution: "© OpenStreetMap contributors",
        },
        TileLayer {
            name: "radar",
            url: format!("{RAINVIEWER_TILES}/{zoom}/{x}/{y}/5/1_0.png"),
            z_index: 5,
            opacity: 1.0,
            attribution: "RainViewer",
        },
        TileLayer {
            name: "temperature",
            url: format!("{provider_base}/map/temp_new/{zoom}/{x}/{y}.png?appid={api_key}"),
            z_index: 6,
            opacity: 0.5,
            attribution: "© OpenWeatherMap",
        },
        TileLayer {
            name: "wind",
            url: format!("{provider_base}/map/wind_new/{zoom}/{x}/{y}.png?appid={api_key}"),
            z_index: 7,
            opacity: 0.5,
            attribution: "© OpenWeatherMap",
        },
    ]
}
