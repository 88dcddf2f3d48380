//! Orchestration of provider calls into the shared [`ViewState`].
//!
//! Every trigger (search, coordinates, unit change, bootstrap) takes a new
//! generation number. Results are folded into the state through
//! [`ViewState::reduce`], which drops anything from an older generation, so
//! the displayed state always belongs to the latest trigger. In-flight
//! requests are never cancelled, only ignored.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Config,
    forecast::derive_views,
    locator::Locator,
    model::{Coordinates, Query, Suggestion, UnitSystem},
    provider::{Providers, UvProvider, WeatherProvider, providers_from_config},
    state::{Action, ViewState},
    storage::{FileStore, Persistence},
};

/// Inputs shorter than this clear suggestions instead of querying.
pub const MIN_SUGGEST_CHARS: usize = 2;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub unit: UnitSystem,
    pub default_city: String,
    pub quiet_period: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            unit: UnitSystem::Metric,
            default_city: "London".to_string(),
            quiet_period: Duration::from_millis(400),
        }
    }
}

impl From<&Config> for DashboardSettings {
    fn from(config: &Config) -> Self {
        Self {
            unit: config.units,
            default_city: config.default_city.clone(),
            quiet_period: config.quiet_period(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    weather: Arc<dyn WeatherProvider>,
    uv: Arc<dyn UvProvider>,
    persistence: Mutex<Persistence>,
    state: watch::Sender<ViewState>,
    generation: AtomicU64,
    input_generation: AtomicU64,
    settings: DashboardSettings,
}

/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct Dashboard {
    inner: Arc<Inner>,
}

impl Dashboard {
    /// Favorites and recents are read from `persistence` once, here.
    pub fn new(providers: Providers, persistence: Persistence, settings: DashboardSettings) -> Self {
        let initial = ViewState::new(
            settings.unit,
            persistence.load_favorites(),
            persistence.load_recents(),
        );
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                weather: providers.weather,
                uv: providers.uv,
                persistence: Mutex::new(persistence),
                state,
                generation: AtomicU64::new(0),
                input_generation: AtomicU64::new(0),
                settings,
            }),
        }
    }

    /// Dashboard backed by the configured providers and the on-disk store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let providers = providers_from_config(config)?;
        let store = FileStore::open(Config::storage_file_path()?);
        Ok(Self::new(providers, Persistence::new(Box::new(store)), config.into()))
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.inner.state.borrow().clone()
    }

    /// Look up a city by name. Blank input is ignored.
    pub async fn search_city(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let unit = self.snapshot().unit;
        self.refresh(Query::City(name.to_string()), unit, None).await;
    }

    pub async fn show_coordinates(&self, coordinates: Coordinates) {
        let unit = self.snapshot().unit;
        self.refresh(Query::Coordinates(coordinates), unit, None).await;
    }

    pub async fn select_suggestion(&self, suggestion: &Suggestion) {
        self.clear_suggestions();
        self.search_city(&suggestion.name).await;
    }

    /// Switch units and re-fetch the active location in the new system.
    pub async fn set_unit(&self, unit: UnitSystem) {
        let (current, active) = {
            let state = self.inner.state.borrow();
            (state.unit, state.active_query())
        };
        if unit == current {
            return;
        }

        match active {
            Some(query) => self.refresh(query, unit, None).await,
            None => {
                self.dispatch(Action::UnitChanged(unit));
            }
        }
    }

    pub async fn toggle_unit(&self) {
        let unit = self.snapshot().unit.toggled();
        self.set_unit(unit).await;
    }

    /// Start from the current position, or the default city if it cannot be
    /// resolved.
    pub async fn bootstrap(&self, locator: &dyn Locator) {
        let unit = self.snapshot().unit;
        match locator.locate().await {
            Ok(coordinates) => {
                self.refresh(Query::Coordinates(coordinates), unit, None).await;
            }
            Err(err) => {
                tracing::info!(
                    "{err}; falling back to {}",
                    self.inner.settings.default_city
                );
                let query = Query::City(self.inner.settings.default_city.clone());
                self.refresh(query, unit, Some(err.advisory().to_string())).await;
            }
        }
    }

    /// Flip favorite membership of `name` and persist it.
    ///
    /// The state update and the storage write happen under one lock.
    /// Returns whether `name` is a favorite afterwards.
    pub fn toggle_favorite(&self, name: &str) -> bool {
        let mut persistence = self.inner.persistence.lock();
        let mut favorites = self.inner.state.borrow().favorites.clone();
        let is_favorite = favorites.toggle(name);

        if let Err(err) = persistence.save_favorites(&favorites) {
            tracing::warn!("Failed to persist favorites: {err}");
        }
        self.dispatch(Action::FavoritesChanged(favorites));
        is_favorite
    }

    /// Feed the latest search-box text.
    ///
    /// The lookup runs once the input has been idle for the quiet period and
    /// only if no later input arrived meanwhile. The returned handle completes
    /// when this input's lookup has settled or been superseded.
    pub fn search_input(&self, text: &str) -> JoinHandle<()> {
        let ticket = self.inner.input_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let text = text.trim().to_string();
        let this = self.clone();

        tokio::spawn(async move {
            if text.chars().count() < MIN_SUGGEST_CHARS {
                this.dispatch_for_input(ticket, Action::SuggestionsCleared);
                return;
            }

            tokio::time::sleep(this.inner.settings.quiet_period).await;
            if !this.is_latest_input(ticket) {
                tracing::debug!("Suggestion lookup for '{text}' superseded");
                return;
            }

            let found = this.inner.weather.suggestions(&text).await;
            if !this.dispatch_for_input(ticket, Action::SuggestionsLoaded(found)) {
                tracing::debug!("Suggestions for '{text}' arrived after newer input");
            }
        })
    }

    /// Input blurred or emptied: drop suggestions and any pending lookup.
    pub fn clear_suggestions(&self) {
        self.inner.input_generation.fetch_add(1, Ordering::SeqCst);
        self.dispatch(Action::SuggestionsCleared);
    }

    fn is_latest_input(&self, ticket: u64) -> bool {
        self.inner.input_generation.load(Ordering::SeqCst) == ticket
    }

    /// Run one refresh cycle; returns once every fetch of the cycle settled.
    async fn refresh(&self, query: Query, unit: UnitSystem, advisory: Option<String>) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(generation, %query, %unit, "Refreshing");

        self.dispatch(Action::RefreshStarted {
            generation,
            query: query.clone(),
            unit,
            advisory,
        });

        let weather = &self.inner.weather;
        let primary = match &query {
            Query::City(name) => weather.current_by_name(name, unit).await,
            Query::Coordinates(c) => weather.current_by_coordinates(*c, unit).await,
        };

        let conditions = match primary {
            Ok(conditions) => conditions,
            Err(err) => {
                tracing::warn!(generation, "Current conditions failed for {query}: {err}");
                self.dispatch(Action::PrimaryFailed { generation, message: err.user_message() });
                return;
            }
        };

        let coordinates = conditions.coordinates;
        if !self.dispatch(Action::PrimaryLoaded { generation, conditions }) {
            return;
        }

        if let Query::City(name) = &query {
            self.remember_recent(name);
        }

        let forecast = async {
            match weather.forecast(coordinates, unit).await {
                Ok(series) => {
                    self.dispatch(Action::ForecastLoaded { generation, views: derive_views(series) });
                }
                Err(err) => tracing::warn!(generation, "Forecast unavailable: {err}"),
            }
        };
        let air_quality = async {
            let air_quality = weather.air_quality(coordinates).await;
            self.dispatch(Action::AirQualityLoaded { generation, air_quality });
        };
        let uv = async {
            let uv_index = self.inner.uv.uv_index(coordinates).await;
            self.dispatch(Action::UvLoaded { generation, uv_index });
        };

        tokio::join!(forecast, air_quality, uv);
    }

    fn remember_recent(&self, name: &str) {
        let mut persistence = self.inner.persistence.lock();
        let mut recents = self.inner.state.borrow().recents.clone();
        recents.push(name);

        if let Err(err) = persistence.save_recents(&recents) {
            tracing::warn!("Failed to persist recent searches: {err}");
        }
        self.dispatch(Action::RecentsChanged(recents));
    }

    /// Apply `action` only while `ticket` is still the latest input.
    ///
    /// The ticket is compared under the state lock, so a newer input or a
    /// clear that bumps the ticket either lands before this check or applies
    /// its own action after it.
    fn dispatch_for_input(&self, ticket: u64, action: Action) -> bool {
        self.inner.state.send_if_modified(|state| {
            if !self.is_latest_input(ticket) {
                return false;
            }
            match state.reduce(action) {
                Some(next) => {
                    *state = next;
                    true
                }
                None => false,
            }
        })
    }

    /// Apply `action`; false when it was discarded.
    fn dispatch(&self, action: Action) -> bool {
        self.inner.state.send_if_modified(|state| match state.reduce(action) {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        })
    }
}
