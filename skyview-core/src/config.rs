use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::{Coordinates, UnitSystem};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "SKYVIEW_API_KEY";

/// How the startup position is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    /// Approximate position from the public IP address.
    #[default]
    Ip,
    /// `fixed_latitude` / `fixed_longitude` from this file.
    Fixed,
    /// Never locate; always start with the default city.
    Off,
}

/// Hosts of the services the dashboard talks to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather_base_url: String,
    pub uv_base_url: String,
    pub geolocation_url: String,
    pub map_tile_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather_base_url: "https://api.openweathermap.org".to_string(),
            uv_base_url: "https://api.open-meteo.com".to_string(),
            geolocation_url: "http://ip-api.com/json".to_string(),
            map_tile_url: "https://tile.openweathermap.org".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "London"
/// units = "metric"
///
/// [endpoints]
/// weather_base_url = "https://api.openweathermap.org"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_city: String,
    pub units: UnitSystem,
    pub locator: LocatorKind,
    pub fixed_latitude: Option<f64>,
    pub fixed_longitude: Option<f64>,
    pub suggest_quiet_period_ms: u64,
    /// Unset means the transport default (no timeout).
    pub request_timeout_secs: Option<u64>,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: "London".to_string(),
            units: UnitSystem::Metric,
            locator: LocatorKind::Ip,
            fixed_latitude: None,
            fixed_longitude: None,
            suggest_quiet_period_ms: 400,
            request_timeout_secs: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the favorites/recents store.
    pub fn storage_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("storage.json"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Result<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `skyview configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.suggest_quiet_period_ms)
    }

    /// Coordinates for the `fixed` locator, if both halves are set.
    pub fn fixed_coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.fixed_latitude?, self.fixed_longitude?))
    }

    /// Shared HTTP client honoring `request_timeout_secs`.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}
