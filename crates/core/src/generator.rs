//! Synthesizes new prompt cards similar to an upvoted one.

use crate::similarity::{loosely_similar, DuplicateCheck, PrefilterCheck, StrictCheck};
use crate::{
    Card, CardText, Catalog, Event, EventBus, GeneratorConfig, Language, NoopTranslator,
    RngState, TaskSpawner, ThreadSpawner, TranslateError, Translator,
};
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

mod templates;

pub use templates::{template_pool, FILTERED_FALLBACKS, LAST_RESORT};

const PROBE_ROUNDS: usize = 3;
const LEXICAL_REWRITES: [(&str, &str); 3] = [
    ("What", "Which"),
    ("When", "At what moment"),
    ("How", "In what way"),
];

#[derive(Clone)]
pub struct CardGenerator {
    catalog: Catalog,
    events: EventBus,
    config: GeneratorConfig,
    translator: Arc<dyn Translator>,
    spawner: Arc<dyn TaskSpawner>,
    prefilter: Arc<dyn DuplicateCheck>,
    strict: Arc<dyn DuplicateCheck>,
}

impl CardGenerator {
    pub fn new(catalog: Catalog, events: EventBus, config: GeneratorConfig) -> Self {
        Self {
            catalog,
            events,
            config,
            translator: Arc::new(NoopTranslator),
            spawner: Arc::new(ThreadSpawner),
            prefilter: Arc::new(PrefilterCheck),
            strict: Arc::new(StrictCheck),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_duplicate_checks(
        mut self,
        prefilter: Arc<dyn DuplicateCheck>,
        strict: Arc<dyn DuplicateCheck>,
    ) -> Self {
        self.prefilter = prefilter;
        self.strict = strict;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Picks a prompt for `source` that does not collide with `existing`
    /// (lowercased English texts).
    pub fn compose_prompt(
        &self,
        source: &Card,
        variation_index: usize,
        existing: &[String],
        rng: &mut RngState,
    ) -> String {
        let mut pool: Vec<&str> = template_pool(source).to_vec();
        rng.shuffle(&mut pool);
        pool.retain(|prompt| !self.prefilter.is_near_duplicate(prompt, existing));
        if pool.is_empty() {
            debug!("every template for {} collides, using fallbacks", source.id);
            pool = FILTERED_FALLBACKS.to_vec();
        }
        rng.shuffle(&mut pool);

        let index = variation_index % pool.len();
        let max_attempts = pool.len() * PROBE_ROUNDS;
        let mut selected = pool[index];
        let mut attempts = 0;
        while attempts < max_attempts {
            if !self.strict.is_near_duplicate(selected, existing) {
                return selected.to_string();
            }
            selected = pool[(index + attempts + 1) % pool.len()];
            attempts += 1;
        }

        let rewritten = LEXICAL_REWRITES
            .iter()
            .fold(selected.to_string(), |text, (from, to)| text.replace(from, to));
        if !loosely_similar(&rewritten, existing) {
            return rewritten;
        }
        (0..LAST_RESORT.len())
            .map(|offset| LAST_RESORT[(variation_index + offset) % LAST_RESORT.len()])
            .find(|prompt| !existing.contains(&prompt.to_lowercase()))
            .map(str::to_string)
            .unwrap_or(rewritten)
    }

    /// Builds one card derived from `source` against the current catalog snapshot.
    pub fn generate_similar(
        &self,
        source: &Card,
        variation_index: usize,
        rng: &mut RngState,
    ) -> Card {
        let existing = self.catalog.english_texts();
        let prompt = self.compose_prompt(source, variation_index, &existing, rng);
        let id = format!(
            "gen-{}-{}-{}-{}",
            Utc::now().timestamp_millis(),
            variation_index,
            rng.base36(9),
            rng.base36(5)
        );
        Card {
            id,
            text: CardText::english(prompt),
            intensity: source.intensity,
            themes: source.themes.clone(),
            formats: source.formats.clone(),
            deck_tags: source.deck_tags.clone(),
            is_story_card: source.is_story_card,
            is_couple_card: source.is_couple_card,
            is_closing_card: source.is_closing_card,
            notes: Some(format!("Generated from {}", source.id)),
        }
    }

    /// Launches a staggered batch of generation tasks and returns how many
    /// were requested. Does not wait for any of them.
    pub fn spawn_batch(&self, source: Card, rng: &mut RngState) -> usize {
        let count = rng.range_inclusive(self.config.min_batch, self.config.max_batch);
        info!("generating {count} cards similar to {}", source.id);
        let remaining = Arc::new(AtomicUsize::new(count));
        let generated = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(source);
        for index in 0..count {
            let generator = self.clone();
            let source = Arc::clone(&source);
            let remaining = Arc::clone(&remaining);
            let generated = Arc::clone(&generated);
            let mut task_rng = rng.fork();
            let delay = self.config.stagger(index);
            self.spawner.spawn(
                &format!("card-generator-{index}"),
                Box::new(move || {
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    if generator.run_task(&source, index, count, &mut task_rng) {
                        generated.fetch_add(1, Ordering::SeqCst);
                    }
                    if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                        let generated = generated.load(Ordering::SeqCst);
                        info!("finished generating for {}: {generated}/{count}", source.id);
                        generator.events.push(Event::GenerationFinished {
                            source_id: source.id.clone(),
                            generated,
                            requested: count,
                        });
                    }
                }),
            );
        }
        count
    }

    fn run_task(&self, source: &Card, index: usize, count: usize, rng: &mut RngState) -> bool {
        let mut card = self.generate_similar(source, index, rng);
        if self.repeats_known_text(&card, source) {
            warn!("generated card for {} repeats known text, retrying", source.id);
            card = self.generate_similar(source, index + count + self.config.retry_offset, rng);
            if self.repeats_known_text(&card, source) {
                warn!("retry for {} repeated known text again, skipping", source.id);
                return false;
            }
        }
        let id = card.id.clone();
        let text = card.text.en.clone();
        if !self.catalog.add_generated(card) {
            return false;
        }
        debug!("[{}/{count}] generated {id}: {text}", index + 1);
        self.events.push(Event::CardGenerated {
            card_id: id.clone(),
            source_id: source.id.clone(),
        });
        self.spawn_translation(id, text);
        true
    }

    fn spawn_translation(&self, card_id: String, text: String) {
        let language = self.config.target_language;
        if language == Language::En {
            return;
        }
        let translator = Arc::clone(&self.translator);
        let catalog = self.catalog.clone();
        let events = self.events.clone();
        self.spawner.spawn(
            "card-translation",
            Box::new(move || match translator.translate(&text, language) {
                Ok(translated) => {
                    if catalog.patch_translation(&card_id, language, translated) {
                        events.push(Event::TranslationPatched { card_id, language });
                    }
                }
                Err(TranslateError::Disabled) => {
                    debug!("translation disabled, keeping English for {card_id}");
                }
                Err(err) => warn!("translation failed for {card_id}, keeping English: {err}"),
            }),
        );
    }

    fn repeats_known_text(&self, card: &Card, source: &Card) -> bool {
        let text = card.text.en.trim().to_lowercase();
        text == source.text.en.trim().to_lowercase()
            || self.catalog.english_texts().contains(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::{DeckTag, InlineSpawner, Intensity, ThemeTag};

    struct AlwaysDuplicate;

    impl DuplicateCheck for AlwaysDuplicate {
        fn is_near_duplicate(&self, _candidate: &str, _existing: &[String]) -> bool {
            true
        }
    }

    struct Upper;

    impl Translator for Upper {
        fn translate(&self, text: &str, _target: Language) -> Result<String, TranslateError> {
            Ok(text.to_uppercase())
        }
    }

    fn source() -> Card {
        Card {
            id: "WARM-01".to_string(),
            text: CardText::english(
                "What scent or sound instantly transports you to a specific moment from your past?",
            ),
            intensity: Intensity::MIN,
            themes: vec![ThemeTag::Nostalgia],
            formats: Vec::new(),
            deck_tags: vec![DeckTag::All, DeckTag::Nostalgia],
            is_story_card: false,
            is_couple_card: false,
            is_closing_card: false,
            notes: None,
        }
    }

    fn generator(catalog: Catalog, events: EventBus) -> CardGenerator {
        let config = GeneratorConfig {
            stagger_ms: 0,
            ..GeneratorConfig::default()
        };
        CardGenerator::new(catalog, events, config).with_spawner(Arc::new(InlineSpawner))
    }

    #[test]
    fn generated_card_inherits_source_attributes() {
        let catalog = Catalog::new(vec![source()], MemoryStore::shared());
        let generator = generator(catalog, EventBus::default());
        let mut rng = RngState::from_seed(9);
        let card = generator.generate_similar(&source(), 1, &mut rng);
        assert!(card.id.starts_with("gen-"));
        assert!(card.id.contains("-1-"));
        assert_eq!(card.intensity, source().intensity);
        assert_eq!(card.deck_tags, source().deck_tags);
        assert_eq!(card.notes.as_deref(), Some("Generated from WARM-01"));
        assert_eq!(card.text.tr, card.text.en);
        assert_ne!(card.text.en.to_lowercase(), source().text.en.to_lowercase());
    }

    #[test]
    fn exhausted_probing_falls_back_to_last_resort() {
        let catalog = Catalog::new(Vec::new(), MemoryStore::shared());
        let generator = generator(catalog, EventBus::default())
            .with_duplicate_checks(Arc::new(AlwaysDuplicate), Arc::new(AlwaysDuplicate));
        let mut rng = RngState::from_seed(2);
        let existing: Vec<String> = FILTERED_FALLBACKS
            .iter()
            .map(|text| {
                LEXICAL_REWRITES
                    .iter()
                    .fold(text.to_string(), |text, (from, to)| text.replace(from, to))
                    .to_lowercase()
            })
            .collect();
        let prompt = generator.compose_prompt(&source(), 7, &existing, &mut rng);
        assert_eq!(prompt, LAST_RESORT[7 % LAST_RESORT.len()]);
    }

    #[test]
    fn last_resort_skips_phrases_already_in_use() {
        let catalog = Catalog::new(Vec::new(), MemoryStore::shared());
        let generator = generator(catalog, EventBus::default())
            .with_duplicate_checks(Arc::new(AlwaysDuplicate), Arc::new(AlwaysDuplicate));
        let mut rng = RngState::from_seed(2);
        let mut existing: Vec<String> = FILTERED_FALLBACKS
            .iter()
            .map(|text| {
                LEXICAL_REWRITES
                    .iter()
                    .fold(text.to_string(), |text, (from, to)| text.replace(from, to))
                    .to_lowercase()
            })
            .collect();
        existing.push(LAST_RESORT[2].to_lowercase());
        let prompt = generator.compose_prompt(&source(), 7, &existing, &mut rng);
        assert_eq!(prompt, LAST_RESORT[3]);
    }

    #[test]
    fn exhausted_probing_rewrites_when_rewrite_is_novel() {
        let catalog = Catalog::new(Vec::new(), MemoryStore::shared());
        let generator = generator(catalog, EventBus::default())
            .with_duplicate_checks(Arc::new(AlwaysDuplicate), Arc::new(AlwaysDuplicate));
        let mut rng = RngState::from_seed(2);
        let prompt = generator.compose_prompt(&source(), 0, &[], &mut rng);
        assert!(!prompt.starts_with("What "));
        assert!(!prompt.starts_with("When "));
        assert!(!prompt.starts_with("How "));
    }

    #[test]
    fn batch_inserts_two_or_three_cards_and_translates() {
        let catalog = Catalog::new(vec![source()], MemoryStore::shared());
        let events = EventBus::default();
        let generator = generator(catalog.clone(), events.clone()).with_translator(Arc::new(Upper));
        let mut rng = RngState::from_seed(4);
        let requested = generator.spawn_batch(source(), &mut rng);
        assert!((2..=3).contains(&requested));

        let generated = catalog.generated_cards();
        assert_eq!(generated.len(), requested);
        for card in &generated {
            assert_eq!(card.text.tr, card.text.en.to_uppercase());
        }
        let drained = events.drain();
        assert!(drained.contains(&Event::GenerationFinished {
            source_id: "WARM-01".to_string(),
            generated: requested,
            requested,
        }));
    }
}
