//! Append-only vote and rating history kept outside the session's lifetime.

use crate::store::{read_json_or_default, write_json, SharedStore, RATINGS_KEY, VOTES_KEY};
use crate::{Card, CardFormat, ThemeTag};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const SAMPLE_CARD_IDS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntry {
    pub card_id: String,
    pub vote: Vote,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub card_id: String,
    pub rating: u8,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub up: usize,
    pub down: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpvotePatterns {
    pub intensity_distribution: BTreeMap<u8, usize>,
    pub theme_distribution: BTreeMap<ThemeTag, usize>,
    pub format_distribution: Vec<(CardFormat, usize)>,
    pub total_upvoted: usize,
    pub sample_card_ids: Vec<String>,
}

#[derive(Clone)]
pub struct VoteLedger {
    store: SharedStore,
    hidden_threshold: usize,
}

impl VoteLedger {
    pub fn new(store: SharedStore, hidden_threshold: usize) -> Self {
        Self {
            store,
            hidden_threshold: hidden_threshold.max(1),
        }
    }

    pub fn entries(&self) -> Vec<VoteEntry> {
        read_json_or_default(self.store.as_ref(), VOTES_KEY)
    }

    pub fn record(&self, card_id: &str, vote: Vote) {
        let mut entries = self.entries();
        entries.push(VoteEntry {
            card_id: card_id.to_string(),
            vote,
            timestamp: Utc::now(),
        });
        if let Err(err) = write_json(self.store.as_ref(), VOTES_KEY, &entries) {
            warn!("failed to persist vote for {card_id}: {err}");
        }
    }

    pub fn tally(&self, card_id: &str) -> VoteTally {
        self.entries()
            .iter()
            .filter(|entry| entry.card_id == card_id)
            .fold(VoteTally::default(), |mut tally, entry| {
                match entry.vote {
                    Vote::Up => tally.up += 1,
                    Vote::Down => tally.down += 1,
                }
                tally
            })
    }

    pub fn is_hidden(&self, card_id: &str) -> bool {
        self.tally(card_id).down >= self.hidden_threshold
    }

    /// Ids of every card at or above the downvote threshold.
    pub fn hidden_ids(&self) -> BTreeSet<String> {
        let mut downs: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.entries() {
            if entry.vote == Vote::Down {
                *downs.entry(entry.card_id).or_insert(0) += 1;
            }
        }
        downs
            .into_iter()
            .filter(|(_, count)| *count >= self.hidden_threshold)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn upvote_patterns(&self, cards: &[Card]) -> Option<UpvotePatterns> {
        let mut upvoted_ids: Vec<String> = Vec::new();
        for entry in self.entries() {
            if entry.vote == Vote::Up && !upvoted_ids.contains(&entry.card_id) {
                upvoted_ids.push(entry.card_id);
            }
        }
        let upvoted: Vec<&Card> = cards
            .iter()
            .filter(|card| upvoted_ids.contains(&card.id))
            .collect();
        if upvoted.is_empty() {
            return None;
        }
        let mut patterns = UpvotePatterns {
            total_upvoted: upvoted.len(),
            sample_card_ids: upvoted_ids.into_iter().take(SAMPLE_CARD_IDS).collect(),
            ..UpvotePatterns::default()
        };
        for card in upvoted {
            *patterns
                .intensity_distribution
                .entry(card.intensity.level())
                .or_insert(0) += 1;
            for theme in &card.themes {
                *patterns.theme_distribution.entry(*theme).or_insert(0) += 1;
            }
            for format in &card.formats {
                match patterns
                    .format_distribution
                    .iter_mut()
                    .find(|(known, _)| known == format)
                {
                    Some((_, count)) => *count += 1,
                    None => patterns.format_distribution.push((*format, 1)),
                }
            }
        }
        Some(patterns)
    }

    pub fn reset(&self) {
        if let Err(err) = self.store.remove(VOTES_KEY) {
            warn!("failed to reset votes: {err}");
        }
    }
}

#[derive(Clone)]
pub struct RatingLedger {
    store: SharedStore,
}

impl RatingLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Vec<RatingEntry> {
        read_json_or_default(self.store.as_ref(), RATINGS_KEY)
    }

    pub fn append(&self, entry: RatingEntry) {
        let mut entries = self.entries();
        entries.push(entry);
        self.persist(&entries);
    }

    pub fn remove_card(&self, card_id: &str) {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry.card_id != card_id);
        if entries.len() != before {
            self.persist(&entries);
        }
    }

    /// Mean of every historical rating, rounded to one decimal.
    pub fn average(&self, card_id: &str) -> Option<f64> {
        let ratings: Vec<u8> = self
            .entries()
            .into_iter()
            .filter(|entry| entry.card_id == card_id)
            .map(|entry| entry.rating)
            .collect();
        if ratings.is_empty() {
            return None;
        }
        let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
        let mean = sum / ratings.len() as f64;
        Some((mean * 10.0).round() / 10.0)
    }

    fn persist(&self, entries: &[RatingEntry]) {
        if let Err(err) = write_json(self.store.as_ref(), RATINGS_KEY, entries) {
            warn!("failed to persist ratings: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::{CardText, DeckTag, Intensity};

    fn card(id: &str, level: u8, themes: Vec<ThemeTag>) -> Card {
        Card {
            id: id.to_string(),
            text: CardText::english(format!("Question {id}?")),
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

    #[test]
    fn repeated_votes_are_all_counted() {
        let ledger = VoteLedger::new(MemoryStore::shared(), 1);
        ledger.record("a", Vote::Up);
        ledger.record("a", Vote::Up);
        ledger.record("a", Vote::Down);
        ledger.record("b", Vote::Up);
        assert_eq!(ledger.tally("a"), VoteTally { up: 2, down: 1 });
        assert_eq!(ledger.entries().len(), 4);
    }

    #[test]
    fn single_downvote_hides_card() {
        let ledger = VoteLedger::new(MemoryStore::shared(), 1);
        ledger.record("a", Vote::Up);
        assert!(!ledger.is_hidden("a"));
        ledger.record("a", Vote::Down);
        assert!(ledger.is_hidden("a"));
        assert!(ledger.hidden_ids().contains("a"));
    }

    #[test]
    fn corrupt_vote_blob_reads_as_empty() {
        let store = MemoryStore::shared();
        store.set(VOTES_KEY, "[{\"broken\"".to_string()).expect("set");
        let ledger = VoteLedger::new(store, 1);
        assert_eq!(ledger.tally("a"), VoteTally::default());
        assert!(!ledger.is_hidden("a"));
    }

    #[test]
    fn upvote_patterns_summarize_upvoted_cards() {
        let ledger = VoteLedger::new(MemoryStore::shared(), 1);
        let cards = vec![
            card("a", 1, vec![ThemeTag::Nostalgia]),
            card("b", 3, vec![ThemeTag::Nostalgia, ThemeTag::Love]),
            card("c", 5, vec![ThemeTag::Shadow]),
        ];
        assert!(ledger.upvote_patterns(&cards).is_none());
        ledger.record("a", Vote::Up);
        ledger.record("b", Vote::Up);
        ledger.record("a", Vote::Up);
        ledger.record("c", Vote::Down);
        let patterns = ledger.upvote_patterns(&cards).expect("patterns");
        assert_eq!(patterns.total_upvoted, 2);
        assert_eq!(patterns.theme_distribution.get(&ThemeTag::Nostalgia), Some(&2));
        assert_eq!(patterns.intensity_distribution.get(&5), None);
        assert_eq!(patterns.format_distribution, vec![(CardFormat::Solo, 2)]);
        assert_eq!(patterns.sample_card_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn average_rating_keeps_history_and_rounds() {
        let ledger = RatingLedger::new(MemoryStore::shared());
        for rating in [4, 2, 5] {
            ledger.append(RatingEntry {
                card_id: "a".to_string(),
                rating,
                timestamp: Utc::now(),
            });
        }
        assert_eq!(ledger.average("a"), Some(3.7));
        ledger.remove_card("a");
        assert_eq!(ledger.average("a"), None);
    }
}
