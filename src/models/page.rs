use serde::{Deserialize, Serialize};

use super::card::CardRecord;

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    #[serde(default)]
    pub items: Vec<CardRecord>,
    pub total_count: usize,
    pub has_more: bool,
    pub page: u32,
    /// Advisory text from the endpoint, e.g. "No cards found".
    pub message: Option<String>,
}

impl ResultPage {
    pub fn empty(page: u32, message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            has_more: false,
            page,
            message: Some(message.into()),
        }
    }
}
