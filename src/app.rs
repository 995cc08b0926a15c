//! Application state management for the Wizi Learn client
//!
//! This module contains the main application state, handling keyboard input, loading
//! catalogue lists through the cached fetch layer, and tracking the toast snapshot the
//! UI renders.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use wizi::api::{Category, Formation, RankingEntry, WiziClient};
use wizi::cache::CacheService;
use wizi::catalog::{Tab, LAST_TAB_PREF};
use wizi::cli::Settings;
use wizi::fetch::CachedFetcher;
use wizi::prefs::PreferenceStore;
use wizi::toast::{ToastConfig, ToastOptions, ToastState, ToastStore, ToastWatch};

/// Maximum number of toasts kept on screen at once
const MAX_TOASTS: usize = 4;

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// First load of the current tab is in progress
    Loading,
    /// Catalogue view
    Ready,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Tab currently shown
    pub tab: Tab,
    /// Index of the selected row in the current tab
    pub selected_index: usize,
    pub categories: Vec<Category>,
    pub formations: Vec<Formation>,
    pub ranking: Vec<RankingEntry>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// The current tab should be loaded (from cache when possible)
    pub load_requested: bool,
    /// The current tab should be reloaded from the backend
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Timestamp of the last completed load
    pub last_refresh: Option<DateTime<Local>>,
    /// Toasts as of the last `sync_toasts` call
    pub toast_snapshot: ToastState,
    /// Shared toast store, also used by the fetch layer for error toasts
    pub toasts: ToastStore,
    toast_view: ToastWatch,
    fetcher: CachedFetcher,
    client: WiziClient,
    prefs: Option<PreferenceStore>,
}

impl App {
    /// Creates a new App from the startup settings
    pub fn new(settings: &Settings) -> Self {
        let toasts = ToastStore::new(ToastConfig {
            default_duration: settings.toast_duration,
            max_toasts: Some(MAX_TOASTS),
            ..ToastConfig::default()
        });
        let fetcher = CachedFetcher::new(CacheService::new())
            .with_toasts(toasts.clone())
            .with_single_flight(settings.single_flight);
        let client = WiziClient::new(settings.api_url.clone(), settings.token.clone());

        Self::with_parts(client, fetcher, toasts, PreferenceStore::new(), settings.initial_tab)
    }

    /// Creates an App from its collaborators
    ///
    /// The starting tab is `initial_tab` if given, else the saved preference, else
    /// categories.
    pub fn with_parts(
        client: WiziClient,
        fetcher: CachedFetcher,
        toasts: ToastStore,
        prefs: Option<PreferenceStore>,
        initial_tab: Option<Tab>,
    ) -> Self {
        let tab = initial_tab
            .or_else(|| {
                prefs
                    .as_ref()
                    .and_then(|p| p.get::<String>(LAST_TAB_PREF))
                    .and_then(|saved| Tab::from_str(&saved))
            })
            .unwrap_or(Tab::Categories);
        let mut toast_view = toasts.watch();
        let toast_snapshot = toast_view.current();

        Self {
            state: AppState::Loading,
            tab,
            selected_index: 0,
            categories: Vec::new(),
            formations: Vec::new(),
            ranking: Vec::new(),
            should_quit: false,
            load_requested: true,
            refresh_requested: false,
            show_help: false,
            last_refresh: None,
            toast_snapshot,
            toasts,
            toast_view,
            fetcher,
            client,
            prefs,
        }
    }

    /// Number of rows in the current tab
    pub fn row_count(&self) -> usize {
        match self.tab {
            Tab::Categories => self.categories.len(),
            Tab::Formations => self.formations.len(),
            Tab::Ranking => self.ranking.len(),
        }
    }

    /// Loads the current tab through the cache
    ///
    /// Failures are already reported as toasts by the fetch layer; the previously
    /// loaded rows are kept in that case.
    pub async fn load_current(&mut self) {
        let tab = self.tab;
        let key = tab.cache_key();
        let options = tab.fetch_options();
        let client = self.client.clone();

        match tab {
            Tab::Categories => {
                let result = self
                    .fetcher
                    .fetch(key, options, move || async move { client.categories().await })
                    .await;
                if let Ok(rows) = result {
                    self.categories = rows;
                }
            }
            Tab::Formations => {
                let result = self
                    .fetcher
                    .fetch(key, options, move || async move { client.formations().await })
                    .await;
                if let Ok(rows) = result {
                    self.formations = rows;
                }
            }
            Tab::Ranking => {
                let result = self
                    .fetcher
                    .fetch(key, options, move || async move { client.ranking().await })
                    .await;
                if let Ok(rows) = result {
                    self.ranking = rows;
                }
            }
        }

        self.clamp_selection();
        self.last_refresh = Some(Local::now());
        self.load_requested = false;
        self.state = AppState::Ready;
    }

    /// Loads both reference lists concurrently so switching tabs hits the cache
    pub async fn prefetch_reference_data(&mut self) {
        let categories_client = self.client.clone();
        let formations_client = self.client.clone();
        let categories = self.fetcher.fetch(
            Tab::Categories.cache_key(),
            Tab::Categories.fetch_options(),
            move || async move { categories_client.categories().await },
        );
        let formations = self.fetcher.fetch(
            Tab::Formations.cache_key(),
            Tab::Formations.fetch_options(),
            move || async move { formations_client.formations().await },
        );

        let (categories, formations) = futures::join!(categories, formations);
        if let Ok(rows) = categories {
            self.categories = rows;
        }
        if let Ok(rows) = formations {
            self.formations = rows;
        }
    }

    /// Runs any load or refresh requested by key handling
    pub async fn process_pending(&mut self) {
        if self.refresh_requested {
            self.refresh_requested = false;
            self.fetcher.invalidate(self.tab.cache_key());
            self.load_current().await;
        } else if self.load_requested {
            self.load_current().await;
        }
    }

    /// Pulls the latest toast state; returns whether it changed
    pub fn sync_toasts(&mut self) -> bool {
        if !self.toast_view.has_changed() {
            return false;
        }
        self.toast_snapshot = self.toast_view.current();
        true
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Tab`/`Right`/`l`: Next tab, `1`-`3`: jump to a tab
    /// - `r`: Reload the current tab from the backend
    /// - `c`: Clear the cache
    /// - `d`: Dismiss all toasts
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Ready => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                    self.switch_tab(self.tab.next());
                }
                KeyCode::Char('1') => self.switch_tab(Tab::Categories),
                KeyCode::Char('2') => self.switch_tab(Tab::Formations),
                KeyCode::Char('3') => self.switch_tab(Tab::Ranking),
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('c') => {
                    self.fetcher.clear();
                    self.toasts.info(
                        "Les données seront rechargées depuis le serveur",
                        ToastOptions::titled("Cache vidé"),
                    );
                }
                KeyCode::Char('d') => {
                    self.toasts.dismiss(None);
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Shows `tab`, remembering it as the last used tab
    fn switch_tab(&mut self, tab: Tab) {
        if tab == self.tab {
            return;
        }
        self.tab = tab;
        self.selected_index = 0;
        self.load_requested = true;

        if let Some(prefs) = &self.prefs {
            if let Err(e) = prefs.set(LAST_TAB_PREF, &tab.as_str()) {
                warn!(error = %e, "failed to save last tab");
            }
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }

    fn clamp_selection(&mut self) {
        let count = self.row_count();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }
}
