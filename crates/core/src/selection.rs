//! Card eligibility filters and the random candidate draw.

use crate::{Card, DeckTag, Intensity, Language, RngState, SessionSettings, VoteLedger};
use log::debug;
use std::collections::BTreeSet;

/// Cards whose deck tags intersect the selection and whose intensity lies in range.
pub fn eligible_cards<'a>(cards: &'a [Card], settings: &SessionSettings) -> Vec<&'a Card> {
    cards
        .iter()
        .filter(|card| {
            card.in_any_deck(&settings.selected_deck_tags)
                && settings.contains_intensity(card.intensity)
        })
        .collect()
}

pub fn drawable_cards<'a>(
    eligible: Vec<&'a Card>,
    used: &BTreeSet<String>,
    skipped: &BTreeSet<String>,
) -> Vec<&'a Card> {
    eligible
        .into_iter()
        .filter(|card| !used.contains(&card.id) && !skipped.contains(&card.id))
        .collect()
}

/// Uniform sample without replacement of `min(count, pool.len())` cards.
pub fn draw(pool: &[&Card], count: usize, rng: &mut RngState) -> Vec<Card> {
    let picked: Vec<Card> = rng
        .sample_indices(pool.len(), count)
        .into_iter()
        .map(|index| pool[index].clone())
        .collect();
    debug!("drew {} of {} drawable cards", picked.len(), pool.len());
    picked
}

/// Drops cards the vote ledger marks hidden. Separate from the round draw.
pub fn visible_cards<'a>(cards: &'a [Card], votes: &VoteLedger) -> Vec<&'a Card> {
    let hidden = votes.hidden_ids();
    cards
        .iter()
        .filter(|card| !hidden.contains(&card.id))
        .collect()
}

/// Browse filter for single-player mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFilter {
    pub deck_tags: BTreeSet<DeckTag>,
    pub intensities: BTreeSet<Intensity>,
    pub query: String,
    pub language: Language,
}

impl Default for CardFilter {
    fn default() -> Self {
        Self {
            deck_tags: DeckTag::SELECTABLE.into_iter().collect(),
            intensities: (1..=5).map(Intensity::clamped).collect(),
            query: String::new(),
            language: Language::En,
        }
    }
}

impl CardFilter {
    /// `all` switches every deck on or off at once; any other tag also clears `all`.
    pub fn toggle_deck_tag(&mut self, tag: DeckTag) {
        if tag == DeckTag::All {
            if self.deck_tags.contains(&DeckTag::All) {
                self.deck_tags.clear();
            } else {
                self.deck_tags = DeckTag::SELECTABLE.into_iter().collect();
            }
        } else if !self.deck_tags.remove(&tag) {
            self.deck_tags.insert(tag);
        } else {
            self.deck_tags.remove(&DeckTag::All);
        }
    }

    /// Toggles an intensity level, refusing to remove the last one.
    pub fn toggle_intensity(&mut self, intensity: Intensity) {
        if self.intensities.contains(&intensity) {
            if self.intensities.len() > 1 {
                self.intensities.remove(&intensity);
            }
        } else {
            self.intensities.insert(intensity);
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        if !card.deck_tags.iter().any(|tag| self.deck_tags.contains(tag)) {
            return false;
        }
        if !self.intensities.contains(&card.intensity) {
            return false;
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty() || card.text_in(self.language).to_lowercase().contains(&query)
    }

    pub fn apply<'a>(&self, cards: &'a [Card], votes: &VoteLedger) -> Vec<&'a Card> {
        visible_cards(cards, votes)
            .into_iter()
            .filter(|card| self.matches(card))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::{CardText, Vote};
    use std::collections::HashSet;

    fn card(id: &str, level: u8, decks: Vec<DeckTag>) -> Card {
        Card {
            id: id.to_string(),
            text: CardText::english(format!("Prompt {id}?")),
            intensity: Intensity::clamped(level),
            themes: Vec::new(),
            formats: Vec::new(),
            deck_tags: decks,
            is_story_card: false,
            is_couple_card: false,
            is_closing_card: false,
            notes: None,
        }
    }

    fn five_cards() -> Vec<Card> {
        [1, 1, 2, 3, 5]
            .iter()
            .enumerate()
            .map(|(i, level)| card(&format!("c{i}"), *level, vec![DeckTag::All]))
            .collect()
    }

    fn settings(min: u8, max: u8) -> SessionSettings {
        SessionSettings {
            selected_deck_tags: vec![DeckTag::All],
            min_intensity: Intensity::clamped(min),
            max_intensity: Intensity::clamped(max),
        }
    }

    #[test]
    fn low_intensity_scenario_draws_all_three() {
        let cards = five_cards();
        let eligible = eligible_cards(&cards, &settings(1, 2));
        let ids: Vec<&str> = eligible.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);

        let mut rng = RngState::from_seed(11);
        let drawn = draw(&eligible, 3, &mut rng);
        let unique: HashSet<&str> = drawn.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(drawn.len(), 3);
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn lowering_max_never_grows_eligible_set() {
        let cards = five_cards();
        let mut previous = usize::MAX;
        for max in (1..=5).rev() {
            let count = eligible_cards(&cards, &settings(1, max)).len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn deck_tags_must_intersect_selection() {
        let cards = vec![
            card("love", 2, vec![DeckTag::Love]),
            card("any", 2, vec![DeckTag::All, DeckTag::Shadow]),
        ];
        let mut only_love = settings(1, 5);
        only_love.selected_deck_tags = vec![DeckTag::Love];
        let ids: Vec<&str> = eligible_cards(&cards, &only_love)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["love"]);
    }

    #[test]
    fn draw_never_repeats_or_overdraws() {
        let cards = five_cards();
        let pool: Vec<&Card> = cards.iter().collect();
        let mut rng = RngState::from_seed(5);
        for _ in 0..50 {
            let drawn = draw(&pool, 3, &mut rng);
            let unique: HashSet<&str> = drawn.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(unique.len(), drawn.len());
            assert_eq!(drawn.len(), 3);
        }
        assert_eq!(draw(&pool[..2], 3, &mut rng).len(), 2);
        assert!(draw(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn drawable_excludes_used_and_skipped() {
        let cards = five_cards();
        let used: BTreeSet<String> = ["c0".to_string()].into_iter().collect();
        let skipped: BTreeSet<String> = ["c1".to_string()].into_iter().collect();
        let pool = drawable_cards(eligible_cards(&cards, &settings(1, 5)), &used, &skipped);
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().all(|c| c.id != "c0" && c.id != "c1"));
    }

    #[test]
    fn browse_filter_hides_downvoted_and_matches_query() {
        let cards = vec![
            card("a", 1, vec![DeckTag::All]),
            card("b", 2, vec![DeckTag::All]),
            card("c", 4, vec![DeckTag::Love]),
        ];
        let votes = VoteLedger::new(MemoryStore::shared(), 1);
        votes.record("a", Vote::Down);

        let mut filter = CardFilter::default();
        let ids: Vec<&str> = filter.apply(&cards, &votes).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        filter.query = "PROMPT c".to_string();
        let ids: Vec<&str> = filter.apply(&cards, &votes).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn browse_filter_toggles() {
        let mut filter = CardFilter::default();
        filter.toggle_deck_tag(DeckTag::All);
        assert!(filter.deck_tags.is_empty());
        filter.toggle_deck_tag(DeckTag::All);
        filter.toggle_deck_tag(DeckTag::Love);
        assert!(!filter.deck_tags.contains(&DeckTag::Love));
        assert!(!filter.deck_tags.contains(&DeckTag::All));

        for level in 1..=5 {
            filter.toggle_intensity(Intensity::clamped(level));
        }
        assert_eq!(filter.intensities.len(), 1);
    }
}
