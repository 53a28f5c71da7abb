//! Collaborator endpoints: search, printings and filter options.
//!
//! [`CardApi`] is the seam between the state layer and whatever serves card
//! data. [`HttpCardApi`] talks to the JSON backend over HTTP; the offline
//! [`LocalCatalog`](crate::catalog::LocalCatalog) answers from DuckDB.
//! Calls are blocking and are run off the event loop by the fetch layer.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config;
use crate::error::{Result, SearchError};
use crate::models::{FilterOptions, PrintingList, Rarity, ResultPage};
use crate::query::SearchQueryKey;

pub const SEARCH_ENDPOINT: &str = "search";
pub const PRINTINGS_ENDPOINT: &str = "printings";
pub const FILTERS_ENDPOINT: &str = "filter-options";

// ---------------------------------------------------------------------------
// SearchRequest
// ---------------------------------------------------------------------------

/// Wire-level search parameters derived from a [`SearchQueryKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub colors: Vec<String>,
    pub types: Vec<String>,
    pub rarity: Option<Rarity>,
}

impl SearchRequest {
    pub fn from_key(key: &SearchQueryKey) -> Self {
        Self {
            query: key.query.clone(),
            page: key.page.max(1),
            colors: key.filters.colors().iter().cloned().collect(),
            types: key.filters.types().iter().cloned().collect(),
            rarity: key.filters.rarity(),
        }
    }

    /// Query-string pairs; empty dimensions are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string())];
        if !self.query.is_empty() {
            pairs.push(("q", self.query.clone()));
        }
        if !self.colors.is_empty() {
            pairs.push(("colors", self.colors.join(",")));
        }
        if !self.types.is_empty() {
            pairs.push(("types", self.types.join(",")));
        }
        if let Some(rarity) = self.rarity {
            pairs.push(("rarity", rarity.as_str().to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// CardApi
// ---------------------------------------------------------------------------

pub trait CardApi: Send + Sync {
    /// Fetch one page of search results.
    fn search(&self, request: &SearchRequest) -> Result<ResultPage>;

    /// All printings of the card named `card_name`.
    fn printings(&self, card_name: &str) -> Result<PrintingList>;

    /// The vocabulary offered by the filter panel.
    fn filter_options(&self) -> Result<FilterOptions>;
}

// ---------------------------------------------------------------------------
// HttpCardApi
// ---------------------------------------------------------------------------

/// [`CardApi`] backed by the card search backend's JSON endpoints.
pub struct HttpCardApi {
    base_url: String,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl HttpCardApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client: Mutex::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lazy HTTP client, created on first use.
    ///
    /// Built on the calling (blocking) thread rather than at construction so
    /// the session can be created from inside an async runtime.
    fn client(&self, endpoint: &'static str) -> Result<Client> {
        let mut slot = self
            .client
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SearchError::transport(endpoint, e))?;
        *slot = Some(client.clone());
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");
        let resp = self
            .client(endpoint)?
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| SearchError::transport(endpoint, e))?;
        let resp = check_status(endpoint, resp)?;
        resp.json::<T>()
            .map_err(|e| SearchError::shape(endpoint, e.to_string()))
    }
}

impl Default for HttpCardApi {
    fn default() -> Self {
        Self::new(config::default_base_url(), config::DEFAULT_TIMEOUT)
    }
}

fn check_status(endpoint: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .unwrap_or_else(|_| "Could not read error body".to_string());
    Err(SearchError::Transport {
        endpoint,
        status: Some(status.as_u16()),
        message: body,
    })
}

impl CardApi for HttpCardApi {
    fn search(&self, request: &SearchRequest) -> Result<ResultPage> {
        let page: ResultPage =
            self.get_json(SEARCH_ENDPOINT, config::SEARCH_PATH, &request.query_pairs())?;
        for card in &page.items {
            card.validate()
                .map_err(|e| SearchError::shape(SEARCH_ENDPOINT, e.to_string()))?;
        }
        Ok(page)
    }

    fn printings(&self, card_name: &str) -> Result<PrintingList> {
        let mut list: PrintingList = self.get_json(
            PRINTINGS_ENDPOINT,
            config::PRINTINGS_PATH,
            &[("name", card_name.to_string())],
        )?;
        list.sort_newest_first();
        Ok(list)
    }

    fn filter_options(&self) -> Result<FilterOptions> {
        let raw: serde_json::Value =
            self.get_json(FILTERS_ENDPOINT, config::FILTERS_PATH, &[])?;
        FilterOptions::from_json(raw)
    }
}
