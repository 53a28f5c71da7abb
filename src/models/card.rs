use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
    Bonus,
    /// Any rarity tag this crate does not know about.
    #[serde(other)]
    Other,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Mythic => "mythic",
            Rarity::Special => "special",
            Rarity::Bonus => "bonus",
            Rarity::Other => "other",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Rarity::Common),
            "uncommon" => Ok(Rarity::Uncommon),
            "rare" => Ok(Rarity::Rare),
            "mythic" => Ok(Rarity::Mythic),
            "special" => Ok(Rarity::Special),
            "bonus" => Ok(Rarity::Bonus),
            other => Err(SearchError::InvalidArgument(format!(
                "unknown rarity: {:?}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ImageUris / Prices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

impl ImageUris {
    /// Preferred image for a detail view: `normal`, then `large`, then `small`.
    pub fn best(&self) -> Option<&str> {
        self.normal
            .as_deref()
            .or(self.large.as_deref())
            .or(self.small.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
}

// ---------------------------------------------------------------------------
// Face — one side of a multi-faced card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Face {
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub image_uris: Option<ImageUris>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faces {
    pub front: Face,
    pub back: Option<Face>,
}

// ---------------------------------------------------------------------------
// CardRecord — logical card identity as returned by the search endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub type_line: String,
    pub mana_cost: Option<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    pub rarity: Rarity,
    #[serde(default)]
    pub set_name: String,
    pub image_uris: Option<ImageUris>,
    pub prices: Option<Prices>,
    pub scryfall_uri: Option<String>,
    #[serde(default)]
    pub has_multiple_faces: bool,
    pub faces: Option<Faces>,
}

impl CardRecord {
    /// True when the card can be flipped to a back face.
    pub fn is_double_faced(&self) -> bool {
        self.has_multiple_faces
            && self
                .faces
                .as_ref()
                .map(|f| f.back.is_some())
                .unwrap_or(false)
    }

    /// Check the record's face invariant: a multi-faced card carries a front face.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.has_multiple_faces && self.faces.is_none() {
            return Err(SearchError::InvalidArgument(format!(
                "card {} is marked multi-faced but has no faces",
                self.id
            )));
        }
        Ok(())
    }
}
