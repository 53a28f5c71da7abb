//! Filter vocabulary served by the filter-options endpoint.
//!
//! The wire payload is decoded into loose `Raw*` shapes first and then
//! validated into closed records, so a malformed option never reaches the
//! filter panel with missing fields.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

use super::card::Rarity;

const ENDPOINT: &str = "filter-options";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    pub value: String,
    pub label: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityOption {
    pub value: Rarity,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub colors: Vec<ColorOption>,
    pub types: Vec<String>,
    pub rarities: Vec<RarityOption>,
}

impl FilterOptions {
    /// Parse and validate an endpoint payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawFilterOptions = serde_json::from_value(value)
            .map_err(|e| SearchError::shape(ENDPOINT, e.to_string()))?;
        raw.validate()
    }

    pub fn has_color(&self, value: &str) -> bool {
        self.colors.iter().any(|c| c.value == value)
    }

    pub fn has_type(&self, value: &str) -> bool {
        self.types.iter().any(|t| t == value)
    }
}

// ---------------------------------------------------------------------------
// Raw wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawColor {
    value: Option<String>,
    label: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRarity {
    value: Option<String>,
    label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFilterOptions {
    colors: Option<Vec<RawColor>>,
    types: Option<Vec<serde_json::Value>>,
    rarities: Option<Vec<RawRarity>>,
}

fn required(field: Option<String>, what: &str, index: usize) -> Result<String> {
    match field {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(SearchError::shape(
            ENDPOINT,
            format!("{} at index {} is missing or empty", what, index),
        )),
    }
}

impl RawFilterOptions {
    fn validate(self) -> Result<FilterOptions> {
        let colors = self
            .colors
            .ok_or_else(|| SearchError::shape(ENDPOINT, "missing `colors`"))?
            .into_iter()
            .enumerate()
            .map(|(i, c)| -> Result<ColorOption> {
                Ok(ColorOption {
                    value: required(c.value, "color value", i)?,
                    label: required(c.label, "color label", i)?,
                    symbol: required(c.symbol, "color symbol", i)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let types = self
            .types
            .ok_or_else(|| SearchError::shape(ENDPOINT, "missing `types`"))?
            .into_iter()
            .enumerate()
            .map(|(i, t)| match t {
                serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s),
                other => Err(SearchError::shape(
                    ENDPOINT,
                    format!("type at index {} is not a non-empty string: {}", i, other),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        let rarities = self
            .rarities
            .ok_or_else(|| SearchError::shape(ENDPOINT, "missing `rarities`"))?
            .into_iter()
            .enumerate()
            .map(|(i, r)| -> Result<RarityOption> {
                let value = required(r.value, "rarity value", i)?;
                let value = value
                    .parse::<Rarity>()
                    .map_err(|e| SearchError::shape(ENDPOINT, e.to_string()))?;
                Ok(RarityOption {
                    value,
                    label: required(r.label, "rarity label", i)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FilterOptions {
            colors,
            types,
            rarities,
        })
    }
}
