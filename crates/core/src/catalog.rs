use crate::store::{read_json, write_json, SharedStore, GENERATED_CARDS_KEY};
use crate::{Card, Language};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// Static cards plus the runtime extension written by the card generator.
#[derive(Clone)]
pub struct Catalog {
    base: Arc<Vec<Card>>,
    store: SharedStore,
    write_lock: Arc<Mutex<()>>,
}

impl Catalog {
    pub fn new(base: Vec<Card>, store: SharedStore) -> Self {
        Self {
            base: Arc::new(base),
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn base_cards(&self) -> &[Card] {
        &self.base
    }

    pub fn generated_cards(&self) -> Vec<Card> {
        read_json(self.store.as_ref(), GENERATED_CARDS_KEY).unwrap_or_default()
    }

    pub fn all_cards(&self) -> Vec<Card> {
        let generated = self.generated_cards();
        debug!(
            "catalog: {} static + {} generated",
            self.base.len(),
            generated.len()
        );
        let mut cards = Vec::with_capacity(self.base.len() + generated.len());
        cards.extend(self.base.iter().cloned());
        cards.extend(generated);
        cards
    }

    pub fn find(&self, id: &str) -> Option<Card> {
        self.base
            .iter()
            .find(|card| card.id == id)
            .cloned()
            .or_else(|| self.generated_cards().into_iter().find(|card| card.id == id))
    }

    pub fn english_texts(&self) -> Vec<String> {
        self.all_cards()
            .iter()
            .map(|card| card.text.en.trim().to_lowercase())
            .collect()
    }

    /// Appends a generated card. Returns `false` when the id or the English
    /// text (case-insensitive) is already present.
    pub fn add_generated(&self, card: Card) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut generated = self.generated_cards();
        if generated.iter().any(|existing| existing.id == card.id) {
            warn!("generated card {} already stored, skipping", card.id);
            return false;
        }
        let text = card.text.en.trim().to_lowercase();
        if self
            .base
            .iter()
            .chain(generated.iter())
            .any(|existing| existing.text.en.trim().to_lowercase() == text)
        {
            warn!("generated card {} repeats existing text, skipping", card.id);
            return false;
        }
        let id = card.id.clone();
        generated.push(card);
        match write_json(self.store.as_ref(), GENERATED_CARDS_KEY, &generated) {
            Ok(()) => {
                info!("stored generated card {id} ({} total)", generated.len());
                true
            }
            Err(err) => {
                warn!("failed to store generated card {id}: {err}");
                false
            }
        }
    }

    /// Backfills a translation on a generated card.
    pub fn patch_translation(&self, id: &str, language: Language, text: String) -> bool {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut generated = self.generated_cards();
        let Some(card) = generated.iter_mut().find(|card| card.id == id) else {
            return false;
        };
        card.text.set(language, text);
        match write_json(self.store.as_ref(), GENERATED_CARDS_KEY, &generated) {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to store translation for {id}: {err}");
                false
            }
        }
    }

    pub fn reset_generated(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = self.store.remove(GENERATED_CARDS_KEY) {
            warn!("failed to reset generated cards: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::{CardText, DeckTag, Intensity};

    fn card(id: &str, text: &str) -> Card {
        Card {
            id: id.to_string(),
            text: CardText::english(text),
            intensity: Intensity::MIN,
            themes: Vec::new(),
            formats: Vec::new(),
            deck_tags: vec![DeckTag::All],
            is_story_card: false,
            is_couple_card: false,
            is_closing_card: false,
            notes: None,
        }
    }

    #[test]
    fn all_cards_appends_generated_extension() {
        let catalog = Catalog::new(vec![card("a", "A?")], MemoryStore::shared());
        assert!(catalog.add_generated(card("gen-1", "B?")));
        let ids: Vec<String> = catalog.all_cards().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "gen-1".to_string()]);
        assert!(catalog.find("gen-1").is_some());
    }

    #[test]
    fn add_generated_is_idempotent() {
        let catalog = Catalog::new(Vec::new(), MemoryStore::shared());
        assert!(catalog.add_generated(card("gen-1", "B?")));
        assert!(!catalog.add_generated(card("gen-1", "Other?")));
        assert_eq!(catalog.generated_cards().len(), 1);
        assert_eq!(catalog.generated_cards()[0].text.en, "B?");
    }

    #[test]
    fn add_generated_rejects_repeated_text() {
        let catalog = Catalog::new(vec![card("a", "Same question?")], MemoryStore::shared());
        assert!(!catalog.add_generated(card("gen-1", "  same QUESTION?")));
        assert!(catalog.add_generated(card("gen-2", "Fresh question?")));
        assert!(!catalog.add_generated(card("gen-3", "fresh question?")));
        assert_eq!(catalog.generated_cards().len(), 1);
    }

    #[test]
    fn unreadable_extension_falls_back_to_static_cards() {
        let store = MemoryStore::shared();
        store
            .set(GENERATED_CARDS_KEY, "oops".to_string())
            .expect("set");
        let catalog = Catalog::new(vec![card("a", "A?")], store);
        assert_eq!(catalog.all_cards().len(), 1);
    }

    #[test]
    fn translation_patch_only_touches_target_language() {
        let catalog = Catalog::new(Vec::new(), MemoryStore::shared());
        catalog.add_generated(card("gen-1", "Hello?"));
        assert!(catalog.patch_translation("gen-1", Language::Tr, "Merhaba?".to_string()));
        let patched = catalog.find("gen-1").expect("card");
        assert_eq!(patched.text.en, "Hello?");
        assert_eq!(patched.text.tr, "Merhaba?");
        assert!(!catalog.patch_translation("missing", Language::Tr, "x".to_string()));
    }
}
