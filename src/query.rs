//! Query coordination: turns the edit buffer, filters and page requests into
//! committed [`SearchQueryKey`]s.
//!
//! The coordinator holds exactly one current key. A commit replaces it
//! synchronously; nothing is queued. Commits that would search for nothing
//! (blank text and no filters) and out-of-range page requests are silent
//! no-ops that return `None`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filter::FilterSelection;
use crate::models::{Rarity, ResultPage};

// ---------------------------------------------------------------------------
// SearchQueryKey
// ---------------------------------------------------------------------------

/// Identity of a committed search. Equal keys share one cache entry and one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQueryKey {
    pub query: String,
    pub filters: FilterSelection,
    pub page: u32,
}

impl SearchQueryKey {
    pub fn new(query: impl Into<String>, filters: FilterSelection, page: u32) -> Self {
        Self {
            query: query.into(),
            filters,
            page,
        }
    }

    /// Same text and filters, ignoring the page.
    pub fn same_search(&self, other: &SearchQueryKey) -> bool {
        self.query == other.query && self.filters == other.filters
    }

    fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// QueryCoordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PageBound {
    key: SearchQueryKey,
    has_more: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCoordinator {
    edit_buffer: String,
    filters: FilterSelection,
    current: Option<SearchQueryKey>,
    last_fetched: Option<PageBound>,
}

impl QueryCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors -----------------------------------------------------------

    /// The in-progress text, as typed.
    pub fn text(&self) -> &str {
        &self.edit_buffer
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn current(&self) -> Option<&SearchQueryKey> {
        self.current.as_ref()
    }

    /// Text of the committed search, which may differ from [`text`](Self::text).
    pub fn committed_query(&self) -> Option<&str> {
        self.current.as_ref().map(|k| k.query.as_str())
    }

    pub fn page(&self) -> u32 {
        self.current.as_ref().map(|k| k.page).unwrap_or(1)
    }

    pub fn is_current(&self, key: &SearchQueryKey) -> bool {
        self.current.as_ref() == Some(key)
    }

    // -- Input ---------------------------------------------------------------

    /// Edit the text buffer. Never commits.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.edit_buffer = text.into();
    }

    /// Explicit submit: commit the buffer and filters at page 1.
    pub fn submit(&mut self) -> Option<SearchQueryKey> {
        self.commit()
    }

    pub fn toggle_color(&mut self, color: &str) -> Option<SearchQueryKey> {
        self.filters = self.filters.toggle_color(color);
        self.commit()
    }

    pub fn toggle_type(&mut self, type_name: &str) -> Option<SearchQueryKey> {
        self.filters = self.filters.toggle_type(type_name);
        self.commit()
    }

    pub fn set_rarity(&mut self, rarity: Option<Rarity>) -> Option<SearchQueryKey> {
        self.filters = self.filters.set_rarity(rarity);
        self.commit()
    }

    pub fn clear_filters(&mut self) -> Option<SearchQueryKey> {
        self.filters = self.filters.clear();
        self.commit()
    }

    /// Move the current search to `page`, keeping its text and filters.
    ///
    /// Rejected when there is no current search, when `page` is 0 or already
    /// current, or when moving forward past a page known to be the last one.
    pub fn request_page(&mut self, page: u32) -> Option<SearchQueryKey> {
        let current = self.current.as_ref()?;
        if page < 1 || page == current.page {
            debug!(page, "page request ignored");
            return None;
        }
        if page > current.page && self.is_past_end(current, page) {
            debug!(page, current = current.page, "page request past last page rejected");
            return None;
        }
        let key = current.with_page(page);
        debug!(query = %key.query, page, "page committed");
        self.current = Some(key.clone());
        Some(key)
    }

    pub fn next_page(&mut self) -> Option<SearchQueryKey> {
        let page = self.current.as_ref()?.page.saturating_add(1);
        self.request_page(page)
    }

    pub fn previous_page(&mut self) -> Option<SearchQueryKey> {
        let page = self.current.as_ref()?.page.saturating_sub(1);
        self.request_page(page)
    }

    /// Note a page that was fetched and shown for `key`, so later page
    /// requests know whether more results exist.
    pub fn record_page(&mut self, key: &SearchQueryKey, page: &ResultPage) {
        self.last_fetched = Some(PageBound {
            key: key.clone(),
            has_more: page.has_more,
        });
    }

    /// Whether a forward move from the current page is known to be possible.
    pub fn can_advance(&self) -> bool {
        match self.current.as_ref() {
            Some(current) => !self.is_past_end(current, current.page.saturating_add(1)),
            None => false,
        }
    }

    // -- Internals -----------------------------------------------------------

    fn is_past_end(&self, current: &SearchQueryKey, page: u32) -> bool {
        match &self.last_fetched {
            Some(bound) => {
                bound.key.same_search(current) && !bound.has_more && page > bound.key.page
            }
            None => false,
        }
    }

    fn commit(&mut self) -> Option<SearchQueryKey> {
        let text = self.edit_buffer.trim();
        if text.is_empty() && self.filters.is_empty() {
            debug!("nothing to search; commit skipped");
            return None;
        }
        let key = SearchQueryKey::new(text, self.filters.clone(), 1);
        debug!(query = %key.query, filters = key.filters.active_count(), "search committed");
        self.current = Some(key.clone());
        Some(key)
    }
}
