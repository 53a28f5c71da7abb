//! Modal navigation state: card detail vs. artwork gallery.
//!
//! At most one modal is open. The detail session's unmodified card is kept
//! as `original_card` while the gallery is open, so a printing picked there
//! is always merged into the card the session started from.
//!
//! Transitions that do not apply in the current state are ignored and
//! return `false`; selection state itself never fails.

use serde::Serialize;
use tracing::debug;

use crate::models::{CardRecord, Printing};
use crate::resolver::{self, DisplayFace, FaceSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Modal {
    #[default]
    Closed,
    Detail,
    Gallery,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    active_card: Option<CardRecord>,
    original_card: Option<CardRecord>,
    active_modal: Modal,
    gallery_query: Option<String>,
    face: FaceSide,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors -----------------------------------------------------------

    pub fn modal(&self) -> Modal {
        self.active_modal
    }

    pub fn active_card(&self) -> Option<&CardRecord> {
        self.active_card.as_ref()
    }

    pub fn original_card(&self) -> Option<&CardRecord> {
        self.original_card.as_ref()
    }

    pub fn gallery_query(&self) -> Option<&str> {
        self.gallery_query.as_deref()
    }

    pub fn face(&self) -> FaceSide {
        self.face
    }

    /// The face currently shown in the detail view.
    pub fn display_face(&self) -> Option<DisplayFace> {
        self.active_card
            .as_ref()
            .map(|card| resolver::resolve_face(card, self.face))
    }

    // -- Transitions ---------------------------------------------------------

    /// Open the detail view on `card`, closing the gallery if it is open.
    /// Starts a new detail session with `card` as its original.
    pub fn open_detail(&mut self, card: CardRecord) {
        debug!(card = %card.name, from = ?self.active_modal, "open detail");
        self.original_card = Some(card.clone());
        self.active_card = Some(card);
        self.gallery_query = None;
        self.active_modal = Modal::Detail;
        self.face = FaceSide::Front;
    }

    /// Close whichever modal is open.
    pub fn close(&mut self) -> bool {
        match self.active_modal {
            Modal::Closed => false,
            Modal::Detail | Modal::Gallery => {
                debug!(from = ?self.active_modal, "close modal");
                *self = Self::default();
                true
            }
        }
    }

    /// Leave the detail view for the artwork gallery of `card_name`.
    ///
    /// Only valid from the detail view. The original card is kept.
    pub fn view_artworks(&mut self, card_name: &str) -> bool {
        let name = card_name.trim();
        if self.active_modal != Modal::Detail || name.is_empty() {
            debug!(state = ?self.active_modal, "view artworks ignored");
            return false;
        }
        debug!(card = %name, "open gallery");
        self.active_card = None;
        self.gallery_query = Some(name.to_string());
        self.active_modal = Modal::Gallery;
        self.face = FaceSide::Front;
        true
    }

    /// Pick a printing in the gallery and return to the detail view showing
    /// the original card with that printing applied.
    pub fn select_printing(&mut self, printing: &Printing) -> bool {
        if self.active_modal != Modal::Gallery {
            debug!(state = ?self.active_modal, "select printing ignored");
            return false;
        }
        let Some(original) = self.original_card.as_ref() else {
            debug!("select printing ignored: no detail session");
            return false;
        };
        let card = resolver::apply_printing(original, printing);
        debug!(card = %card.name, set = %card.set_name, "printing selected");
        self.active_card = Some(card);
        self.gallery_query = None;
        self.active_modal = Modal::Detail;
        self.face = FaceSide::Front;
        true
    }

    /// Flip between front and back face. Ignored unless the detail view
    /// shows a double-faced card.
    pub fn toggle_face(&mut self) -> bool {
        let flippable = self.active_modal == Modal::Detail
            && self
                .active_card
                .as_ref()
                .map(CardRecord::is_double_faced)
                .unwrap_or(false);
        if flippable {
            self.face = self.face.flipped();
        }
        flippable
    }
}
