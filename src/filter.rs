//! Structured filter selection (colors, types, rarity).
//!
//! [`FilterSelection`] is an immutable value: every operation returns a new
//! selection and leaves the receiver untouched. Sets are ordered so equality
//! and hashing ignore insertion order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::Rarity;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    colors: BTreeSet<String>,
    types: BTreeSet<String>,
    rarity: Option<Rarity>,
}

impl FilterSelection {
    /// The canonical empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors(&self) -> &BTreeSet<String> {
        &self.colors
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    pub fn rarity(&self) -> Option<Rarity> {
        self.rarity
    }

    /// Add `color` if absent, remove it if present.
    pub fn toggle_color(&self, color: &str) -> Self {
        let mut next = self.clone();
        toggle(&mut next.colors, color);
        next
    }

    /// Add `type_name` if absent, remove it if present.
    pub fn toggle_type(&self, type_name: &str) -> Self {
        let mut next = self.clone();
        toggle(&mut next.types, type_name);
        next
    }

    /// Replace the rarity; `None` unsets it.
    pub fn set_rarity(&self, rarity: Option<Rarity>) -> Self {
        Self {
            rarity,
            ..self.clone()
        }
    }

    pub fn clear(&self) -> Self {
        Self::default()
    }

    /// True when no dimension carries a value.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.types.is_empty() && self.rarity.is_none()
    }

    /// Number of active filter values, for a badge on the filter toggle.
    pub fn active_count(&self) -> usize {
        self.colors.len() + self.types.len() + usize::from(self.rarity.is_some())
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}
