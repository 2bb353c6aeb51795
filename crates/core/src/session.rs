use crate::{
    Card, CardGenerator, Catalog, Event, EventBus, GameInfo, Intensity, DeckTag, Player,
    RatingLedger, RngState, Screen, SessionConfig, SessionSettings, SessionState,
    SettingsUpdate, SharedStore, TaskSpawner, Translator, VoteLedger,
};
use log::{debug, info};
use std::sync::Arc;

mod closing;
mod feedback;
mod lobby;
mod rounds;

pub use closing::ClosingStep;
pub use lobby::GameBlob;

/// The aggregate root: owns the session state and drives every transition.
pub struct Session {
    config: SessionConfig,
    store: SharedStore,
    catalog: Catalog,
    votes: VoteLedger,
    ratings: RatingLedger,
    generator: CardGenerator,
    rng: RngState,
    events: EventBus,
    state: SessionState,
    game: GameInfo,
    closing: closing::ClosingProgress,
}

impl Session {
    pub fn new(cards: Vec<Card>, store: SharedStore, config: SessionConfig, seed: u64) -> Self {
        let events = EventBus::default();
        let catalog = Catalog::new(cards, Arc::clone(&store));
        let generator =
            CardGenerator::new(catalog.clone(), events.clone(), config.generator.clone());
        Self {
            votes: VoteLedger::new(Arc::clone(&store), config.hidden_downvote_threshold),
            ratings: RatingLedger::new(Arc::clone(&store)),
            rng: RngState::from_seed(seed),
            state: SessionState::default(),
            game: GameInfo::default(),
            closing: closing::ClosingProgress::default(),
            config,
            store,
            catalog,
            generator,
            events,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.generator = self.generator.with_translator(translator);
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.generator = self.generator.with_spawner(spawner);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn votes(&self) -> &VoteLedger {
        &self.votes
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Handle for observers; generation tasks publish to the same queue.
    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    pub fn drain_events(&self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn screen(&self) -> Screen {
        self.state.current_screen
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.state.settings
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn round(&self) -> u32 {
        self.state.current_round_number
    }

    pub fn candidates(&self) -> &[Card] {
        &self.state.current_candidate_cards
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.state.current_selected_card.as_ref()
    }

    pub fn answering_player(&self) -> Option<&Player> {
        self.state
            .current_answering_player_id
            .as_deref()
            .and_then(|id| self.state.player(id))
    }

    /// True while a round is showing and the drawable pool ran dry.
    pub fn out_of_cards(&self) -> bool {
        self.state.current_screen.in_round_loop() && self.state.current_candidate_cards.is_empty()
    }

    pub fn set_screen(&mut self, screen: Screen) {
        let from = self.state.current_screen;
        if from != screen {
            debug!("screen {from:?} -> {screen:?}");
        }
        self.state.current_screen = screen;
        self.events.push(Event::ScreenChanged { from, to: screen });
    }

    /// Registers a participant. Blank names are refused.
    pub fn add_player(&mut self, name: &str) -> Option<String> {
        if name.trim().is_empty() {
            return None;
        }
        let player = Player::new(name);
        let id = player.id.clone();
        info!("player {} joined as {id}", player.name);
        self.state.players.push(player);
        Some(id)
    }

    pub fn remove_player(&mut self, id: &str) {
        let Some(index) = self.state.players.iter().position(|player| player.id == id) else {
            return;
        };
        self.state.players.remove(index);
        self.closing.player_removed(index);
        self.state.answered_in_current_cycle.remove(id);
        if self.state.current_answering_player_id.as_deref() == Some(id) {
            self.state.current_answering_player_id = None;
        }
        if self.game.is_host {
            self.publish_game();
        }
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.state.settings.apply(update);
    }

    pub fn set_min_intensity(&mut self, min: Intensity) {
        self.state.settings.set_min_intensity(min);
    }

    pub fn set_max_intensity(&mut self, max: Intensity) {
        self.state.settings.set_max_intensity(max);
    }

    pub fn toggle_deck_tag(&mut self, tag: DeckTag) {
        self.state.settings.toggle_deck_tag(tag);
    }

    /// Players who have not answered in the current rotation; everyone once
    /// the rotation is complete.
    pub fn eligible_players(&self) -> Vec<&Player> {
        let waiting: Vec<&Player> = self
            .state
            .players
            .iter()
            .filter(|player| !self.state.answered_in_current_cycle.contains(&player.id))
            .collect();
        if waiting.is_empty() {
            self.state.players.iter().collect()
        } else {
            waiting
        }
    }
}
