use serde::{Deserialize, Serialize};

use super::card::{ImageUris, Prices, Rarity};

// ---------------------------------------------------------------------------
// Printing — one set/artwork/edition of a card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printing {
    pub id: String,
    pub name: String,
    pub set_name: String,
    pub set_code: String,
    pub collector_number: String,
    /// Release date as `YYYY-MM-DD`.
    pub released_at: String,
    pub rarity: Rarity,
    pub artist: Option<String>,
    pub flavor_text: Option<String>,
    pub image_uris: Option<ImageUris>,
    pub back_image_uris: Option<ImageUris>,
    pub prices: Option<Prices>,
    pub scryfall_uri: Option<String>,
}

impl Printing {
    /// Short label for a gallery tile, e.g. `Throne of Eldraine (ELD) #171`.
    pub fn display_label(&self) -> String {
        format!(
            "{} ({}) #{}",
            self.set_name,
            self.set_code.to_uppercase(),
            self.collector_number
        )
    }
}

// ---------------------------------------------------------------------------
// PrintingList — printings endpoint payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingList {
    #[serde(default)]
    pub items: Vec<Printing>,
    pub total_count: usize,
    pub card_name: String,
}

impl PrintingList {
    /// Order printings newest first. ISO dates sort lexically.
    pub fn sort_newest_first(&mut self) {
        self.items
            .sort_by(|a, b| b.released_at.cmp(&a.released_at).then_with(|| a.id.cmp(&b.id)));
    }
}
