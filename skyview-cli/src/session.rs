//! Interactive menu loop over a [`Dashboard`].

use std::fmt;

use inquire::{InquireError, Select, Text};
use skyview_core::{Config, Dashboard, Locator, Recents, Suggestion};

use crate::{cli::map_layers, render::render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Search,
    ToggleUnits,
    ToggleFavorite,
    OpenFavorite,
    PreviousRecent,
    NextRecent,
    OpenRecent,
    Locate,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuItem::Search => "Search a city",
            MenuItem::ToggleUnits => "Switch °C / °F",
            MenuItem::ToggleFavorite => "Add or remove favorite",
            MenuItem::OpenFavorite => "Open a favorite",
            MenuItem::PreviousRecent => "Previous recent search",
            MenuItem::NextRecent => "Next recent search",
            MenuItem::OpenRecent => "Open shown recent search",
            MenuItem::Locate => "Use my location",
            MenuItem::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// A picked suggestion, or the typed text searched as-is.
#[derive(Debug, Clone)]
enum Pick {
    Suggestion(Suggestion),
    AsTyped(String),
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Suggestion(s) => write!(f, "{s}"),
            Pick::AsTyped(text) => write!(f, "Search \"{text}\""),
        }
    }
}

pub struct Session {
    config: Config,
    dashboard: Dashboard,
    locator: Box<dyn Locator>,
    carousel: RecentCarousel,
}

impl Session {
    pub fn new(config: Config, dashboard: Dashboard, locator: Box<dyn Locator>) -> Self {
        Self { config, dashboard, locator, carousel: RecentCarousel::default() }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.dashboard.bootstrap(self.locator.as_ref()).await;

        loop {
            self.show();

            let items = vec![
                MenuItem::Search,
                MenuItem::ToggleUnits,
                MenuItem::ToggleFavorite,
                MenuItem::OpenFavorite,
                MenuItem::PreviousRecent,
                MenuItem::NextRecent,
                MenuItem::OpenRecent,
                MenuItem::Locate,
                MenuItem::Quit,
            ];
            let Some(item) = prompt(move || Select::new("What next?", items).prompt()).await?
            else {
                break;
            };

            match item {
                MenuItem::Search => self.search().await?,
                MenuItem::ToggleUnits => self.dashboard.toggle_unit().await,
                MenuItem::ToggleFavorite => self.toggle_favorite(),
                MenuItem::OpenFavorite => self.open_favorite().await?,
                MenuItem::PreviousRecent => self.step_recent(-1),
                MenuItem::NextRecent => self.step_recent(1),
                MenuItem::OpenRecent => self.open_recent().await,
                MenuItem::Locate => self.dashboard.bootstrap(self.locator.as_ref()).await,
                MenuItem::Quit => break,
            }
        }

        Ok(())
    }

    fn show(&self) {
        let state = self.dashboard.snapshot();
        let overlays = map_layers(&self.config, &state);
        println!("{}", render(&state, &overlays));
        if let Some(line) = self.carousel.describe(&state.recents) {
            println!("{line}");
        }
    }

    async fn search(&self) -> anyhow::Result<()> {
        let Some(text) = prompt(|| Text::new("City:").prompt()).await? else {
            self.dashboard.clear_suggestions();
            return Ok(());
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            self.dashboard.clear_suggestions();
            return Ok(());
        }

        self.dashboard.search_input(&text).await?;
        let suggestions = self.dashboard.snapshot().suggestions;
        if suggestions.is_empty() {
            self.dashboard.search_city(&text).await;
            return Ok(());
        }

        let mut picks: Vec<Pick> = suggestions.into_iter().map(Pick::Suggestion).collect();
        picks.push(Pick::AsTyped(text));
        match prompt(move || Select::new("Did you mean:", picks).prompt()).await? {
            Some(Pick::Suggestion(s)) => self.dashboard.select_suggestion(&s).await,
            Some(Pick::AsTyped(text)) => {
                self.dashboard.clear_suggestions();
                self.dashboard.search_city(&text).await;
            }
            None => self.dashboard.clear_suggestions(),
        }
        Ok(())
    }

    fn toggle_favorite(&self) {
        let state = self.dashboard.snapshot();
        match state.current {
            Some(current) => {
                let added = self.dashboard.toggle_favorite(&current.location_name);
                let verb = if added { "Added" } else { "Removed" };
                println!("{verb} {}", current.location_name);
            }
            None => println!("Nothing to favorite yet"),
        }
    }

    async fn open_favorite(&self) -> anyhow::Result<()> {
        let favorites = self.dashboard.snapshot().favorites;
        if favorites.is_empty() {
            println!("No favorites added");
            return Ok(());
        }

        let names = favorites.as_slice().to_vec();
        if let Some(name) = prompt(move || Select::new("Favorite:", names).prompt()).await? {
            self.dashboard.search_city(&name).await;
        }
        Ok(())
    }

    fn step_recent(&mut self, step: isize) {
        let recents = self.dashboard.snapshot().recents;
        if self.carousel.step(&recents, step).is_none() {
            println!("No recent searches");
        }
    }

    /// Load the entry under the carousel. The search moves it to the front,
    /// so the carousel restarts there.
    async fn open_recent(&mut self) {
        let recents = self.dashboard.snapshot().recents;
        let Some(name) = self.carousel.current(&recents).map(str::to_string) else {
            println!("No recent searches");
            return;
        };
        self.dashboard.search_city(&name).await;
        self.carousel.reset();
    }
}

/// Browsing position over the recent searches, independent of fetching.
#[derive(Debug, Default)]
struct RecentCarousel {
    index: usize,
}

impl RecentCarousel {
    /// Move by `step`, wrapping at both ends, and return the entry now shown.
    fn step<'a>(&mut self, recents: &'a Recents, step: isize) -> Option<&'a str> {
        if recents.is_empty() {
            self.index = 0;
            return None;
        }
        let from = self.index.min(recents.len() - 1);
        self.index = recents.cycle(from, step);
        recents.get(self.index)
    }

    fn current<'a>(&self, recents: &'a Recents) -> Option<&'a str> {
        recents.get(self.index.min(recents.len().saturating_sub(1)))
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn describe(&self, recents: &Recents) -> Option<String> {
        let name = self.current(recents)?;
        let position = self.index.min(recents.len() - 1) + 1;
        Some(format!("Recent {position}/{}: {name}", recents.len()))
    }
}

/// Run a blocking prompt off the runtime. Esc and Ctrl-C yield `None`.
async fn prompt<T, F>(f: F) -> anyhow::Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InquireError> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await? {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
