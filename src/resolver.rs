//! Card view model resolution: which face to show, and how a chosen
//! printing is folded into a card.

use serde::Serialize;

use crate::models::{CardRecord, Face, ImageUris, Prices, Printing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FaceSide {
    #[default]
    Front,
    Back,
}

impl FaceSide {
    pub fn flipped(self) -> Self {
        match self {
            FaceSide::Front => FaceSide::Back,
            FaceSide::Back => FaceSide::Front,
        }
    }
}

/// Face data ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayFace {
    pub name: String,
    pub type_line: String,
    pub mana_cost: Option<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub image_uris: Option<ImageUris>,
    /// Side actually resolved; `Front` whenever the card cannot flip.
    pub side: FaceSide,
}

impl DisplayFace {
    /// `"3/4"` when both power and toughness are present.
    pub fn power_toughness(&self) -> Option<String> {
        match (&self.power, &self.toughness) {
            (Some(p), Some(t)) => Some(format!("{}/{}", p, t)),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&str> {
        self.image_uris.as_ref().and_then(|i| i.best())
    }
}

/// Resolve the face to display for `side`.
///
/// The back face is used only when the card is double-faced; otherwise the
/// front face is returned regardless of `side`. A chosen face is copied as
/// is, absent fields included. The card's top-level fields are used only
/// when the card carries no face data at all.
pub fn resolve_face(card: &CardRecord, side: FaceSide) -> DisplayFace {
    let side = if card.is_double_faced() { side } else { FaceSide::Front };

    let face: Option<&Face> = card.faces.as_ref().and_then(|faces| match side {
        FaceSide::Front => Some(&faces.front),
        FaceSide::Back => faces.back.as_ref(),
    });

    let Some(face) = face else {
        return DisplayFace {
            name: card.name.clone(),
            type_line: card.type_line.clone(),
            mana_cost: card.mana_cost.clone(),
            oracle_text: card.oracle_text.clone(),
            power: card.power.clone(),
            toughness: card.toughness.clone(),
            image_uris: card.image_uris.clone(),
            side,
        };
    };

    DisplayFace {
        name: face.name.clone(),
        type_line: face.type_line.clone().unwrap_or_default(),
        mana_cost: face.mana_cost.clone(),
        oracle_text: face.oracle_text.clone(),
        power: face.power.clone(),
        toughness: face.toughness.clone(),
        image_uris: face.image_uris.clone(),
        side,
    }
}

/// Fold a printing into the card it belongs to.
///
/// Only `id`, `set_name`, `image_uris`, `prices` and `scryfall_uri` come
/// from the printing. Rules text, colors, faces and rarity stay as on
/// `original`. Always pass the unmodified card of the detail session, never
/// a card that already had a printing applied.
pub fn apply_printing(original: &CardRecord, printing: &Printing) -> CardRecord {
    CardRecord {
        id: printing.id.clone(),
        set_name: printing.set_name.clone(),
        image_uris: printing.image_uris.clone(),
        prices: printing.prices.clone(),
        scryfall_uri: printing.scryfall_uri.clone(),
        ..original.clone()
    }
}

/// Prices formatted with currency symbols, for the price panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisplayPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
    pub eur: Option<String>,
    pub eur_foil: Option<String>,
}

impl DisplayPrices {
    pub fn from_prices(prices: &Prices) -> Self {
        let dollars = |p: &Option<String>| p.as_ref().map(|v| format!("${}", v));
        let euros = |p: &Option<String>| p.as_ref().map(|v| format!("€{}", v));
        Self {
            usd: dollars(&prices.usd),
            usd_foil: dollars(&prices.usd_foil),
            eur: euros(&prices.eur),
            eur_foil: euros(&prices.eur_foil),
        }
    }

    pub fn for_card(card: &CardRecord) -> Self {
        card.prices
            .as_ref()
            .map(Self::from_prices)
            .unwrap_or_default()
    }
}
