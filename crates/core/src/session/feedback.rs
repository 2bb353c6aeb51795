use super::Session;
use crate::*;
use chrono::Utc;
use log::{debug, warn};

pub const MAX_RATING: u8 = 5;

impl Session {
    /// Flips favorite membership and returns whether the card is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        if self.state.favorites.remove(id) {
            false
        } else {
            self.state.favorites.insert(id.to_string());
            true
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.favorites.contains(id)
    }

    /// `0` clears the rating everywhere; `1..=5` replaces the session rating and
    /// appends to the history. Anything above 5 is refused.
    pub fn rate_card(&mut self, id: &str, rating: u8) -> bool {
        if rating > MAX_RATING {
            return false;
        }
        self.state.card_ratings.retain(|entry| entry.card_id != id);
        if rating == 0 {
            self.ratings.remove_card(id);
            return true;
        }
        let entry = RatingEntry {
            card_id: id.to_string(),
            rating,
            timestamp: Utc::now(),
        };
        self.state.card_ratings.push(entry.clone());
        self.ratings.append(entry);
        true
    }

    pub fn card_rating(&self, id: &str) -> Option<u8> {
        self.state
            .card_ratings
            .iter()
            .find(|entry| entry.card_id == id)
            .map(|entry| entry.rating)
    }

    pub fn average_rating(&self, id: &str) -> Option<f64> {
        self.ratings.average(id)
    }

    /// Records a vote. An up-vote on a known card starts a background batch of
    /// similar cards and returns how many were requested.
    pub fn vote_card(&mut self, id: &str, vote: Vote) -> usize {
        self.votes.record(id, vote);
        self.events.push(Event::CardVoted {
            card_id: id.to_string(),
            vote,
        });
        if vote == Vote::Down {
            return 0;
        }
        match self.catalog.find(id) {
            Some(card) => self.generator.spawn_batch(card, &mut self.rng),
            None => {
                warn!("upvoted card {id} not found in catalog");
                0
            }
        }
    }

    pub fn card_votes(&self, id: &str) -> VoteTally {
        self.votes.tally(id)
    }

    pub fn is_card_hidden(&self, id: &str) -> bool {
        self.votes.is_hidden(id)
    }

    /// Single-player browse over the full catalog, hidden cards removed.
    pub fn browse(&self, filter: &CardFilter) -> Vec<Card> {
        let cards = self.catalog.all_cards();
        let visible: Vec<Card> = filter.apply(&cards, &self.votes).into_iter().cloned().collect();
        debug!("browse: {} of {} cards visible", visible.len(), cards.len());
        visible
    }

    pub fn upvote_patterns(&self) -> Option<UpvotePatterns> {
        self.votes.upvote_patterns(&self.catalog.all_cards())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn card(id: &str, text: &str, level: u8, themes: Vec<ThemeTag>) -> Card {
        Card {
            id: id.to_string(),
            text: CardText::english(text),
            intensity: Intensity::clamped(level),
            themes,
            formats: vec![CardFormat::Solo],
            deck_tags: vec![DeckTag::All],
            is_story_card: false,
            is_couple_card: false,
            is_closing_card: false,
            notes: None,
        }
    }

    fn session() -> Session {
        let cards = vec![
            card(
                "WARM-01",
                "What scent or sound instantly transports you to a specific moment from your past?",
                1,
                vec![ThemeTag::Nostalgia],
            ),
            card(
                "DEEP-01",
                "What truth about yourself did you resist acknowledging for the longest time?",
                3,
                vec![ThemeTag::Shadow],
            ),
        ];
        let config = SessionConfig {
            generator: GeneratorConfig {
                stagger_ms: 0,
                ..GeneratorConfig::default()
            },
            ..SessionConfig::default()
        };
        Session::new(cards, MemoryStore::shared(), config, 8).with_spawner(Arc::new(InlineSpawner))
    }

    #[test]
    fn rating_zero_clears_and_rerating_replaces() {
        let mut session = session();
        assert!(session.rate_card("WARM-01", 4));
        assert!(session.rate_card("WARM-01", 2));
        let session_ratings: Vec<u8> = session
            .state()
            .card_ratings
            .iter()
            .filter(|entry| entry.card_id == "WARM-01")
            .map(|entry| entry.rating)
            .collect();
        assert_eq!(session_ratings, vec![2]);
        assert_eq!(session.average_rating("WARM-01"), Some(3.0));

        assert!(session.rate_card("WARM-01", 0));
        assert_eq!(session.card_rating("WARM-01"), None);
        assert_eq!(session.average_rating("WARM-01"), None);
        assert!(!session.rate_card("WARM-01", 6));
    }

    #[test]
    fn favorites_toggle() {
        let mut session = session();
        assert!(session.toggle_favorite("WARM-01"));
        assert!(session.is_favorite("WARM-01"));
        assert!(!session.toggle_favorite("WARM-01"));
        assert!(!session.is_favorite("WARM-01"));
    }

    #[test]
    fn upvote_generates_similar_cards() {
        let mut session = session();
        let before = session.catalog().all_cards();
        let requested = session.vote_card("WARM-01", Vote::Up);
        assert!((2..=3).contains(&requested));

        let after = session.catalog().all_cards();
        assert_eq!(after.len(), before.len() + requested);
        let existing: Vec<String> = before.iter().map(|c| c.text.en.to_lowercase()).collect();
        for card in &after[before.len()..] {
            assert_eq!(card.notes.as_deref(), Some("Generated from WARM-01"));
            assert!(!existing.contains(&card.text.en.to_lowercase()));
        }
        assert_eq!(session.card_votes("WARM-01"), VoteTally { up: 1, down: 0 });
    }

    #[test]
    fn repeated_upvotes_never_repeat_catalog_text() {
        let mut session = session();
        for _ in 0..15 {
            session.vote_card("WARM-01", Vote::Up);
        }
        let cards = session.catalog().all_cards();
        assert!(cards.len() > 2);
        let mut seen = std::collections::BTreeSet::new();
        for card in &cards {
            let text = card.text.en.trim().to_lowercase();
            assert!(seen.insert(text), "{} repeats {:?}", card.id, card.text.en);
        }
        assert_eq!(session.card_votes("WARM-01").up, 15);
    }

    #[test]
    fn downvote_hides_without_generating() {
        let mut session = session();
        assert_eq!(session.vote_card("DEEP-01", Vote::Down), 0);
        assert!(session.is_card_hidden("DEEP-01"));
        assert_eq!(session.catalog().generated_cards().len(), 0);
        let visible = session.browse(&CardFilter::default());
        assert!(visible.iter().all(|c| c.id != "DEEP-01"));
    }

    #[test]
    fn upvote_of_unknown_card_only_records_vote() {
        let mut session = session();
        assert_eq!(session.vote_card("missing", Vote::Up), 0);
        assert_eq!(session.card_votes("missing").up, 1);
    }
}
