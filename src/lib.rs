//! Card search SDK for Rust.
//!
//! Client-side state layer for a Scryfall-style card search front end: it
//! turns the search box, filter panel and pagination into committed query
//! keys, fetches each key at most once, discards results that arrive for a
//! superseded key, and resolves cards, faces and printings into the data a
//! detail view shows.
//!
//! # Quick start
//!
//! ```no_run
//! use mtgsearch_sdk::SearchSession;
//!
//! # async fn example() -> mtgsearch_sdk::Result<()> {
//! let mut session = SearchSession::builder()
//!     .base_url("http://localhost:8000/api")
//!     .build()?;
//!
//! session.set_text("Lightning Bolt");
//! if let Some(key) = session.submit() {
//!     session.run_search(&key).await;
//! }
//! if let Some(page) = session.results().and_then(|r| r.status.data()) {
//!     println!("{} cards", page.total_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod query;
pub mod resolver;
pub mod selection;
pub mod sql_builder;

pub use catalog::{CatalogEntry, LocalCatalog};
pub use client::{CardApi, HttpCardApi, SearchRequest};
pub use error::{Result, SearchError};
pub use fetch::{FetchCache, FetchOutcome, FetchStatus};
pub use filter::FilterSelection;
pub use query::{QueryCoordinator, SearchQueryKey};
pub use resolver::{DisplayFace, DisplayPrices, FaceSide};
pub use selection::{Modal, SelectionState};
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use models::{CardRecord, FilterOptions, Printing, PrintingList, Rarity, ResultPage};

// ---------------------------------------------------------------------------
// SearchSessionBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SearchSession`].
///
/// Use [`SearchSession::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SearchSessionBuilder::build).
pub struct SearchSessionBuilder {
    base_url: Option<String>,
    timeout: Duration,
    api: Option<(Arc<dyn CardApi>, String)>,
}

impl Default for SearchSessionBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            api: None,
        }
    }
}

impl SearchSessionBuilder {
    /// Set the backend base URL.
    ///
    /// If not set, `MTGSEARCH_API_URL` is used, falling back to
    /// [`config::DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Serve card data from `api` instead of the HTTP backend, e.g. a
    /// [`LocalCatalog`]. Overrides [`base_url`](Self::base_url).
    pub fn api(mut self, api: Arc<dyn CardApi>) -> Self {
        self.api = Some((api, "custom".to_string()));
        self
    }

    /// Serve card data from an offline catalog.
    pub fn catalog(mut self, catalog: LocalCatalog) -> Self {
        self.api = Some((Arc::new(catalog), "local-catalog".to_string()));
        self
    }

    /// Build the session. No request is made until the first fetch.
    pub fn build(self) -> Result<SearchSession> {
        let (api, source) = match self.api {
            Some(api) => api,
            None => {
                let url = self.base_url.unwrap_or_else(config::default_base_url);
                if url.trim().is_empty() {
                    return Err(SearchError::InvalidArgument(
                        "base URL must not be empty".to_string(),
                    ));
                }
                let http = HttpCardApi::new(url, self.timeout);
                let source = http.base_url().to_string();
                (Arc::new(http) as Arc<dyn CardApi>, source)
            }
        };
        info!(%source, "search session created");
        Ok(SearchSession {
            api,
            source,
            searches: Arc::new(FetchCache::new()),
            printings: Arc::new(FetchCache::new()),
            coordinator: QueryCoordinator::new(),
            selection: SelectionState::new(),
            filter_panel: FilterPanel::NotLoaded,
            displayed: None,
            gallery: None,
        })
    }
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// Results shown for the current search key.
#[derive(Debug, Clone)]
pub struct DisplayedResults {
    pub key: SearchQueryKey,
    pub status: FetchStatus<ResultPage>,
}

/// State of the filter panel's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPanel {
    NotLoaded,
    Available(FilterOptions),
    /// Options could not be fetched; the panel is disabled but text search
    /// keeps working.
    Unavailable,
}

impl FilterPanel {
    pub fn options(&self) -> Option<&FilterOptions> {
        match self {
            FilterPanel::Available(options) => Some(options),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SearchSession
// ---------------------------------------------------------------------------

/// One user's search session.
///
/// Owns the query coordinator, the result caches, the modal selection state
/// and the collaborator API. Input methods are synchronous and return the
/// newly committed key, if any. Fetches are split in two steps so several
/// can be outstanding at once: [`fetch_search`](Self::fetch_search) returns
/// an owned future, and [`apply_search`](Self::apply_search) shows its
/// outcome only if the key is still current.
pub struct SearchSession {
    api: Arc<dyn CardApi>,
    source: String,
    searches: Arc<FetchCache<SearchQueryKey, ResultPage>>,
    printings: Arc<FetchCache<String, PrintingList>>,
    coordinator: QueryCoordinator,
    selection: SelectionState,
    filter_panel: FilterPanel,
    displayed: Option<DisplayedResults>,
    gallery: Option<FetchStatus<PrintingList>>,
}

impl SearchSession {
    pub fn builder() -> SearchSessionBuilder {
        SearchSessionBuilder::default()
    }

    // -- Accessors -----------------------------------------------------------

    pub fn coordinator(&self) -> &QueryCoordinator {
        &self.coordinator
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn filters(&self) -> &FilterSelection {
        self.coordinator.filters()
    }

    pub fn current_key(&self) -> Option<&SearchQueryKey> {
        self.coordinator.current()
    }

    pub fn results(&self) -> Option<&DisplayedResults> {
        self.displayed.as_ref()
    }

    pub fn filter_panel(&self) -> &FilterPanel {
        &self.filter_panel
    }

    /// Printings for the open gallery, if the gallery is open.
    pub fn gallery(&self) -> Option<&FetchStatus<PrintingList>> {
        self.gallery.as_ref()
    }

    pub fn search_cache(&self) -> &FetchCache<SearchQueryKey, ResultPage> {
        &self.searches
    }

    // -- Search input --------------------------------------------------------

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.coordinator.set_text(text);
    }

    /// Commit the current text and filters. A key whose last fetch failed is
    /// cleared so that submitting again retries it.
    pub fn submit(&mut self) -> Option<SearchQueryKey> {
        let key = self.coordinator.submit()?;
        self.searches.forget_failure(&key);
        self.show(&key);
        Some(key)
    }

    pub fn toggle_color(&mut self, color: &str) -> Option<SearchQueryKey> {
        let key = self.coordinator.toggle_color(color);
        self.committed(key)
    }

    pub fn toggle_type(&mut self, type_name: &str) -> Option<SearchQueryKey> {
        let key = self.coordinator.toggle_type(type_name);
        self.committed(key)
    }

    pub fn set_rarity(&mut self, rarity: Option<Rarity>) -> Option<SearchQueryKey> {
        let key = self.coordinator.set_rarity(rarity);
        self.committed(key)
    }

    pub fn clear_filters(&mut self) -> Option<SearchQueryKey> {
        let key = self.coordinator.clear_filters();
        self.committed(key)
    }

    pub fn request_page(&mut self, page: u32) -> Option<SearchQueryKey> {
        let key = self.coordinator.request_page(page);
        self.committed(key)
    }

    pub fn next_page(&mut self) -> Option<SearchQueryKey> {
        let key = self.coordinator.next_page();
        self.committed(key)
    }

    pub fn previous_page(&mut self) -> Option<SearchQueryKey> {
        let key = self.coordinator.previous_page();
        self.committed(key)
    }

    fn committed(&mut self, key: Option<SearchQueryKey>) -> Option<SearchQueryKey> {
        let key = key?;
        self.show(&key);
        Some(key)
    }

    /// Point the result view at `key`, using whatever the cache already holds.
    fn show(&mut self, key: &SearchQueryKey) {
        let status = match self.searches.status(key) {
            FetchStatus::Idle => FetchStatus::Loading,
            other => other,
        };
        if let FetchStatus::Success(page) = &status {
            self.coordinator.record_page(key, page);
        }
        self.displayed = Some(DisplayedResults {
            key: key.clone(),
            status,
        });
    }

    // -- Search fetches ------------------------------------------------------

    /// Fetch `key` through the result cache.
    ///
    /// The returned future owns everything it needs, so the session stays
    /// free for further input while it is pending. Feed the outcome to
    /// [`apply_search`](Self::apply_search).
    pub fn fetch_search(
        &self,
        key: &SearchQueryKey,
    ) -> impl Future<Output = FetchOutcome<ResultPage>> + Send + 'static {
        let cache = Arc::clone(&self.searches);
        let api = Arc::clone(&self.api);
        let key = key.clone();
        async move {
            let request = SearchRequest::from_key(&key);
            cache.fetch(&key, move || api.search(&request)).await
        }
    }

    /// Show the outcome of a fetch for `key`, unless a different key has
    /// been committed since. Returns whether the outcome was shown.
    pub fn apply_search(&mut self, key: &SearchQueryKey, outcome: FetchOutcome<ResultPage>) -> bool {
        if !self.coordinator.is_current(key) {
            debug!(query = %key.query, page = key.page, "stale search result discarded");
            return false;
        }
        if let Ok(page) = &outcome {
            self.coordinator.record_page(key, page);
        }
        self.displayed = Some(DisplayedResults {
            key: key.clone(),
            status: outcome.into(),
        });
        true
    }

    /// Fetch `key` and apply the outcome.
    pub async fn run_search(&mut self, key: &SearchQueryKey) -> bool {
        let outcome = self.fetch_search(key).await;
        self.apply_search(key, outcome)
    }

    // -- Filter options ------------------------------------------------------

    /// Load the filter vocabulary once. A failure disables the filter panel
    /// without affecting text search.
    pub async fn load_filter_options(&mut self) -> &FilterPanel {
        if matches!(self.filter_panel, FilterPanel::Available(_)) {
            return &self.filter_panel;
        }
        let api = Arc::clone(&self.api);
        let result = tokio::task::spawn_blocking(move || api.filter_options()).await;
        self.filter_panel = match result {
            Ok(Ok(options)) => FilterPanel::Available(options),
            Ok(Err(e)) => {
                warn!(error = %e, "filter options unavailable");
                FilterPanel::Unavailable
            }
            Err(join) => {
                warn!(error = %join, "filter options task aborted");
                FilterPanel::Unavailable
            }
        };
        &self.filter_panel
    }

    // -- Detail / gallery ----------------------------------------------------

    pub fn open_detail(&mut self, card: CardRecord) {
        self.gallery = None;
        self.selection.open_detail(card);
    }

    pub fn close_modal(&mut self) -> bool {
        self.gallery = None;
        self.selection.close()
    }

    pub fn toggle_face(&mut self) -> bool {
        self.selection.toggle_face()
    }

    pub fn display_face(&self) -> Option<DisplayFace> {
        self.selection.display_face()
    }

    /// Switch from the detail view to the artwork gallery for `card_name`.
    ///
    /// Returns the name whose printings should be fetched. Reopening a
    /// gallery whose last fetch failed retries it.
    pub fn view_artworks(&mut self, card_name: &str) -> Option<String> {
        if !self.selection.view_artworks(card_name) {
            return None;
        }
        let name = self.selection.gallery_query()?.to_string();
        self.printings.forget_failure(&name);
        self.gallery = Some(match self.printings.status(&name) {
            FetchStatus::Idle => FetchStatus::Loading,
            other => other,
        });
        Some(name)
    }

    pub fn fetch_printings(
        &self,
        card_name: &str,
    ) -> impl Future<Output = FetchOutcome<PrintingList>> + Send + 'static {
        let cache = Arc::clone(&self.printings);
        let api = Arc::clone(&self.api);
        let name = card_name.to_string();
        async move {
            let query = name.clone();
            cache.fetch(&name, move || api.printings(&query)).await
        }
    }

    /// Show printings fetched for `card_name` if the gallery still shows
    /// that card. Failures stay in the gallery as an error state.
    pub fn apply_printings(&mut self, card_name: &str, outcome: FetchOutcome<PrintingList>) -> bool {
        if self.selection.modal() != Modal::Gallery
            || self.selection.gallery_query() != Some(card_name)
        {
            debug!(card = %card_name, "stale printings discarded");
            return false;
        }
        self.gallery = Some(outcome.into());
        true
    }

    /// Fetch and apply printings for the open gallery.
    pub async fn run_printings(&mut self) -> bool {
        let Some(name) = self.selection.gallery_query().map(str::to_string) else {
            return false;
        };
        let outcome = self.fetch_printings(&name).await;
        self.apply_printings(&name, outcome)
    }

    /// Pick a printing from the gallery and return to the detail view.
    pub fn select_printing(&mut self, printing: &Printing) -> bool {
        let selected = self.selection.select_printing(printing);
        if selected {
            self.gallery = None;
        }
        selected
    }

    // -- Lifecycle -----------------------------------------------------------

    /// End the session, dropping every cached result.
    pub fn end(self) {
        self.searches.clear();
        self.printings.clear();
        info!(source = %self.source, "search session ended");
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SearchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SearchSession(source={}, query={:?}, page={}, cached={}, modal={:?})",
            self.source,
            self.coordinator.committed_query().unwrap_or(""),
            self.coordinator.page(),
            self.searches.len(),
            self.selection.modal()
        )
    }
}
