use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use allcards_core::{Card, CardFormat, DeckTag, Intensity, SessionConfig, ThemeTag};

/// Version of the bundled card set.
pub const CARD_SET_VERSION: &str = "2.1.0";

/// Counts shown by the terminal driver's `stats` command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub version: String,
    pub total: usize,
    pub closing: usize,
    pub translated: usize,
    pub by_intensity: BTreeMap<u8, usize>,
    pub by_deck: BTreeMap<String, usize>,
}

impl CatalogSummary {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut summary = Self {
            version: CARD_SET_VERSION.to_string(),
            total: cards.len(),
            ..Self::default()
        };
        for card in cards {
            if card.is_closing_card {
                summary.closing += 1;
            }
            if !card.text.tr.trim().is_empty() && card.text.tr != card.text.en {
                summary.translated += 1;
            }
            *summary
                .by_intensity
                .entry(card.intensity.level())
                .or_default() += 1;
            for tag in &card.deck_tags {
                *summary.by_deck.entry(tag.key().to_string()).or_default() += 1;
            }
        }
        summary
    }
}
