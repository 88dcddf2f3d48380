//! The single render-ready view-state and its transition function.
//!
//! A [`ViewState`] is never mutated in place by callers: [`ViewState::reduce`]
//! takes an [`Action`] and returns the next state, or `None` when the action
//! belongs to a superseded refresh and must be discarded.

use crate::{
    forecast::ForecastViews,
    model::{AirQualityIndex, CurrentConditions, ForecastEntry, Location, Query, Suggestion, UnitSystem, UvIndex},
    places::{Favorites, Recents},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Primary fetch in flight.
    Loading,
    /// Current conditions shown; side channels may still be merging in.
    Ready,
    /// Primary fetch failed; `error` holds the message.
    Errored,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// Generation of the refresh this state reflects.
    pub generation: u64,
    pub phase: Phase,
    pub unit: UnitSystem,
    /// Most recently triggered query.
    pub query: Option<Query>,
    /// Active location, set from the last successful primary fetch.
    pub location: Option<Location>,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<ForecastEntry>,
    pub daily: Vec<ForecastEntry>,
    pub air_quality: Option<AirQualityIndex>,
    pub uv_index: Option<UvIndex>,
    pub error: Option<String>,
    /// Non-blocking notice, e.g. the geolocation fallback message.
    pub advisory: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub favorites: Favorites,
    pub recents: Recents,
    has_loaded: bool,
}

#[derive(Debug, Clone)]
pub enum Action {
    RefreshStarted {
        generation: u64,
        query: Query,
        unit: UnitSystem,
        advisory: Option<String>,
    },
    PrimaryLoaded {
        generation: u64,
        conditions: CurrentConditions,
    },
    PrimaryFailed {
        generation: u64,
        message: String,
    },
    ForecastLoaded {
        generation: u64,
        views: ForecastViews,
    },
    AirQualityLoaded {
        generation: u64,
        air_quality: Option<AirQualityIndex>,
    },
    UvLoaded {
        generation: u64,
        uv_index: Option<UvIndex>,
    },
    /// Unit change with nothing to re-fetch.
    UnitChanged(UnitSystem),
    SuggestionsLoaded(Vec<Suggestion>),
    SuggestionsCleared,
    FavoritesChanged(Favorites),
    RecentsChanged(Recents),
}

impl ViewState {
    pub fn new(unit: UnitSystem, favorites: Favorites, recents: Recents) -> Self {
        Self { unit, favorites, recents, ..Self::default() }
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.contains(name)
    }

    /// Query to re-issue on a unit change.
    ///
    /// While loading that is the pending query; otherwise the coordinates of
    /// the active location. After a failed primary fetch there is none.
    pub fn active_query(&self) -> Option<Query> {
        match self.phase {
            Phase::Loading => self.query.clone(),
            _ => self.location.as_ref().map(|l| Query::Coordinates(l.coordinates())),
        }
    }

    pub fn reduce(&self, action: Action) -> Option<ViewState> {
        let mut next = self.clone();

        match action {
            Action::RefreshStarted { generation, query, unit, advisory } => {
                if generation <= self.generation {
                    return None;
                }
                next.generation = generation;
                next.phase = Phase::Loading;
                next.query = Some(query);
                next.error = None;
                next.advisory = advisory;
                next.suggestions.clear();
                if unit != self.unit {
                    next.unit = unit;
                    next.clear_weather();
                }
            }
            Action::PrimaryLoaded { generation, conditions } => {
                self.current_generation(generation)?;
                next.phase = Phase::Ready;
                next.error = None;
                next.clear_side_channels();
                next.location = Some(conditions.location());
                next.current = Some(conditions);
                next.has_loaded = true;
            }
            Action::PrimaryFailed { generation, message } => {
                self.current_generation(generation)?;
                next.phase = Phase::Errored;
                next.error = Some(message);
                next.current = None;
                next.location = None;
                if self.has_loaded {
                    next.clear_side_channels();
                }
            }
            Action::ForecastLoaded { generation, views } => {
                self.ready_generation(generation)?;
                next.hourly = views.hourly;
                next.daily = views.daily;
            }
            Action::AirQualityLoaded { generation, air_quality } => {
                self.ready_generation(generation)?;
                next.air_quality = air_quality;
            }
            Action::UvLoaded { generation, uv_index } => {
                self.ready_generation(generation)?;
                next.uv_index = uv_index;
            }
            Action::UnitChanged(unit) => {
                if unit == self.unit {
                    return None;
                }
                next.unit = unit;
                next.clear_weather();
            }
            Action::SuggestionsLoaded(suggestions) => next.suggestions = suggestions,
            Action::SuggestionsCleared => {
                if self.suggestions.is_empty() {
                    return None;
                }
                next.suggestions.clear();
            }
            Action::FavoritesChanged(favorites) => next.favorites = favorites,
            Action::RecentsChanged(recents) => next.recents = recents,
        }

        Some(next)
    }

    fn current_generation(&self, generation: u64) -> Option<()> {
        if generation == self.generation {
            Some(())
        } else {
            tracing::debug!(generation, latest = self.generation, "Discarding stale result");
            None
        }
    }

    /// Side-channel results only land on a state that is showing their refresh.
    fn ready_generation(&self, generation: u64) -> Option<()> {
        self.current_generation(generation)?;
        (self.phase == Phase::Ready).then_some(())
    }

    fn clear_side_channels(&mut self) {
        self.hourly.clear();
        self.daily.clear();
        self.air_quality = None;
        self.uv_index = None;
    }

    fn clear_weather(&mut self) {
        self.current = None;
        self.clear_side_channels();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use chrono::Utc;

    fn conditions(name: &str) -> CurrentConditions {
        CurrentConditions {
            location_name: name.to_string(),
            temperature: 20.0,
            feels_like: 19.0,
            humidity_pct: 40,
            wind_speed: 3.0,
            wind_direction_deg: Some(90.0),
            description: "clear sky".to_string(),
            sunrise: None,
            sunset: None,
            timezone_offset_secs: 0,
            coordinates: Coordinates::new(1.0, 2.0),
            observation_time: Utc::now(),
        }
    }

    fn start(state: &ViewState, generation: u64, city: &str) -> ViewState {
        state
            .reduce(Action::RefreshStarted {
                generation,
                query: Query::City(city.to_string()),
                unit: state.unit,
                advisory: None,
            })
            .unwrap()
    }

    fn loaded(state: &ViewState, generation: u64, city: &str) -> ViewState {
        state
            .reduce(Action::PrimaryLoaded { generation, conditions: conditions(city) })
            .unwrap()
    }

    #[test]
    fn refresh_cycle_moves_through_phases() {
        let s = ViewState::default();
        assert_eq!(s.phase, Phase::Idle);

        let s = start(&s, 1, "Paris");
        assert_eq!(s.phase, Phase::Loading);

        let s = loaded(&s, 1, "Paris");
        assert_eq!(s.phase, Phase::Ready);
        assert_eq!(s.location.as_ref().map(|l| l.name.as_str()), Some("Paris"));

        let s = s
            .reduce(Action::AirQualityLoaded { generation: 1, air_quality: AirQualityIndex::new(2) })
            .unwrap();
        assert_eq!(s.air_quality.map(|a| a.value()), Some(2));
    }

    #[test]
    fn stale_generation_is_discarded() {
        let s = start(&ViewState::default(), 1, "Paris");
        let s = start(&s, 2, "Tokyo");

        assert!(s.reduce(Action::PrimaryLoaded { generation: 1, conditions: conditions("Paris") }).is_none());
        assert!(s.reduce(Action::PrimaryFailed { generation: 1, message: "x".into() }).is_none());

        let s = loaded(&s, 2, "Tokyo");
        assert!(s.reduce(Action::UvLoaded { generation: 1, uv_index: Some(UvIndex(4.0)) }).is_none());
        assert_eq!(s.current.as_ref().map(|c| c.location_name.as_str()), Some("Tokyo"));
    }

    #[test]
    fn older_refresh_start_cannot_rewind_generation() {
        let s = start(&ViewState::default(), 5, "Paris");
        assert!(
            s.reduce(Action::RefreshStarted {
                generation: 4,
                query: Query::City("Oslo".into()),
                unit: UnitSystem::Metric,
                advisory: None,
            })
            .is_none()
        );
    }

    #[test]
    fn side_channels_wait_for_primary() {
        let s = start(&ViewState::default(), 1, "Paris");
        assert!(s.reduce(Action::AirQualityLoaded { generation: 1, air_quality: AirQualityIndex::new(1) }).is_none());
    }

    #[test]
    fn failure_after_success_clears_side_channels() {
        let s = loaded(&start(&ViewState::default(), 1, "Paris"), 1, "Paris");
        let s = s.reduce(Action::UvLoaded { generation: 1, uv_index: Some(UvIndex(3.0)) }).unwrap();

        let s = start(&s, 2, "Nowhere");
        let s = s.reduce(Action::PrimaryFailed { generation: 2, message: "city not found".into() }).unwrap();

        assert_eq!(s.phase, Phase::Errored);
        assert_eq!(s.error.as_deref(), Some("city not found"));
        assert!(s.current.is_none());
        assert!(s.uv_index.is_none());
        assert!(s.active_query().is_none());
    }

    #[test]
    fn unit_change_invalidates_displayed_weather() {
        let s = loaded(&start(&ViewState::default(), 1, "Paris"), 1, "Paris");
        let s = s
            .reduce(Action::RefreshStarted {
                generation: 2,
                query: Query::Coordinates(Coordinates::new(1.0, 2.0)),
                unit: UnitSystem::Imperial,
                advisory: None,
            })
            .unwrap();

        assert_eq!(s.unit, UnitSystem::Imperial);
        assert!(s.current.is_none());
        assert_eq!(s.phase, Phase::Loading);
    }

    #[test]
    fn active_query_prefers_pending_query_while_loading() {
        let s = loaded(&start(&ViewState::default(), 1, "Paris"), 1, "Paris");
        assert_eq!(s.active_query(), Some(Query::Coordinates(Coordinates::new(1.0, 2.0))));

        let s = start(&s, 2, "Rome");
        assert_eq!(s.active_query(), Some(Query::City("Rome".into())));
    }

    #[test]
    fn new_trigger_clears_suggestions_and_sets_advisory() {
        let s = ViewState::default()
            .reduce(Action::SuggestionsLoaded(vec![Suggestion { name: "Lo".into(), country: "GB".into() }]))
            .unwrap();
        let s = s
            .reduce(Action::RefreshStarted {
                generation: 1,
                query: Query::City("London".into()),
                unit: UnitSystem::Metric,
                advisory: Some("fallback".into()),
            })
            .unwrap();

        assert!(s.suggestions.is_empty());
        assert_eq!(s.advisory.as_deref(), Some("fallback"));
    }
}
