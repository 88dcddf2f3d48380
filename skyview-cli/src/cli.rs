use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use skyview_core::{
    Config, Coordinates, Dashboard, UnitSystem, ViewState, locator_from_config,
    map::{DEFAULT_ZOOM, TileLayer, overlay_layers},
    storage::{FileStore, Persistence},
};

use crate::{render::render, session::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default city and units.
    Configure,

    /// Show the dashboard for a city, a coordinate pair, or the current position.
    Show {
        /// City name; omit to use the configured locator.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// "metric" or "imperial"; overrides the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,

        /// Skip the map layer listing.
        #[arg(long)]
        no_map: bool,
    },

    /// List city suggestions for a partial name.
    Suggest { text: String },

    /// Add a city to favorites, or remove it if already present.
    Favorite { city: String },

    /// List favorite cities.
    Favorites,

    /// List recent searches, newest first.
    Recent,

    /// Start an interactive session.
    Interactive,
}

fn parse_units(s: &str) -> anyhow::Result<UnitSystem> {
    UnitSystem::try_from(s)
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, lat, lon, units, no_map } => {
                let mut config = Config::load()?;
                if let Some(units) = units {
                    config.units = units;
                }
                let dashboard = Dashboard::from_config(&config)?;

                match (city, lat.zip(lon)) {
                    (Some(city), _) => dashboard.search_city(&city).await,
                    (None, Some((lat, lon))) => {
                        dashboard.show_coordinates(Coordinates::new(lat, lon)).await
                    }
                    (None, None) => {
                        let locator = locator_from_config(&config)?;
                        dashboard.bootstrap(locator.as_ref()).await;
                    }
                }

                let state = dashboard.snapshot();
                let overlays = if no_map { Vec::new() } else { map_layers(&config, &state) };
                print!("{}", render(&state, &overlays));
            }
            Command::Suggest { text } => {
                let config = Config::load()?;
                let dashboard = Dashboard::from_config(&config)?;
                dashboard.search_input(&text).await?;

                let suggestions = dashboard.snapshot().suggestions;
                if suggestions.is_empty() {
                    println!("No suggestions");
                }
                for suggestion in suggestions {
                    println!("{suggestion}");
                }
            }
            Command::Favorite { city } => {
                let config = Config::load()?;
                let dashboard = Dashboard::from_config(&config)?;
                println!("{}", toggle_favorite(&dashboard, &city)?);
            }
            Command::Favorites => {
                let favorites = open_persistence()?.load_favorites();
                if favorites.is_empty() {
                    println!("No favorites added");
                }
                for name in favorites.as_slice() {
                    println!("{name}");
                }
            }
            Command::Recent => {
                let recents = open_persistence()?.load_recents();
                if recents.is_empty() {
                    println!("No recent searches");
                }
                for name in recents.as_slice() {
                    println!("{name}");
                }
            }
            Command::Interactive => {
                let config = Config::load()?;
                let dashboard = Dashboard::from_config(&config)?;
                let locator = locator_from_config(&config)?;
                Session::new(config, dashboard, locator).run().await?;
            }
        }

        Ok(())
    }
}

/// Toggle through the dashboard so the store has a single writer.
fn toggle_favorite(dashboard: &Dashboard, city: &str) -> anyhow::Result<String> {
    let city = city.trim();
    anyhow::ensure!(!city.is_empty(), "City name must not be empty");

    if dashboard.toggle_favorite(city) {
        Ok(format!("Added {city} to favorites"))
    } else {
        Ok(format!("Removed {city} from favorites"))
    }
}

fn open_persistence() -> anyhow::Result<Persistence> {
    let store = FileStore::open(Config::storage_file_path()?);
    Ok(Persistence::new(Box::new(store)))
}

/// Overlay tiles around the active location, if there is one.
pub fn map_layers(config: &Config, state: &ViewState) -> Vec<TileLayer> {
    let (Some(location), Ok(api_key)) = (&state.location, config.api_key()) else {
        return Vec::new();
    };
    overlay_layers(location, DEFAULT_ZOOM, &config.endpoints.map_tile_url, &api_key)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let mut key_prompt = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation();
    if config.api_key.is_some() {
        key_prompt = key_prompt.with_help_message("Leave empty to keep the current key");
    }
    let api_key = key_prompt.prompt().context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    let start = match config.units {
        UnitSystem::Metric => 0,
        UnitSystem::Imperial => 1,
    };
    config.units = Select::new("Units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
