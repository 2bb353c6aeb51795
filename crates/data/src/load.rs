use crate::schema::{Card, DeckTag, SessionConfig};
use anyhow::{bail, Context};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const CARDS_FILE: &str = "cards.json";
const CONFIG_FILE: &str = "config.json";
const BUILTIN_CARDS: &str = include_str!("../../../assets/cards.json");

/// The catalog compiled into the binary.
pub fn builtin_cards() -> anyhow::Result<Vec<Card>> {
    let cards: Vec<Card> = serde_json::from_str(BUILTIN_CARDS).context("parse builtin cards")?;
    validate_cards(&cards).context("builtin cards")?;
    Ok(cards)
}

/// Loads `cards.json` from `dir` when it exists, otherwise the builtin catalog.
pub fn load_catalog(dir: &Path) -> anyhow::Result<Vec<Card>> {
    let path = dir.join(CARDS_FILE);
    if !path.exists() {
        debug!("{} not found, using builtin cards", path.display());
        return builtin_cards();
    }
    load_cards_file(&path)
}

pub fn load_cards_file(path: &Path) -> anyhow::Result<Vec<Card>> {
    let cards: Vec<Card> = load_json(path)?;
    validate_cards(&cards).with_context(|| format!("validate {}", path.display()))?;
    info!("loaded {} cards from {}", cards.len(), path.display());
    Ok(cards)
}

pub fn load_session_config(dir: &Path) -> anyhow::Result<SessionConfig> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(SessionConfig::default());
    }
    let config: SessionConfig = load_json(&path)?;
    if config.candidate_count == 0 {
        bail!("candidate_count must be positive in {}", path.display());
    }
    if config.generator.min_batch > config.generator.max_batch {
        bail!(
            "generator min_batch {} exceeds max_batch {} in {}",
            config.generator.min_batch,
            config.generator.max_batch,
            path.display()
        );
    }
    Ok(config)
}

pub fn validate_cards(cards: &[Card]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for card in cards {
        if card.id.trim().is_empty() {
            bail!("card id cannot be empty");
        }
        if !seen.insert(card.id.as_str()) {
            bail!("duplicate card id {}", card.id);
        }
        if card.text.en.trim().is_empty() {
            bail!("card {} has no english text", card.id);
        }
        if card.deck_tags.is_empty() {
            bail!("card {} has no deck tags", card.id);
        }
        if card.is_closing_card && card.deck_tags.contains(&DeckTag::All) {
            bail!("closing card {} cannot be in the default deck", card.id);
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
