use super::Session;
use crate::store::{game_key, read_json, write_json};
use crate::*;
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const PIN_RANGE: (usize, usize) = (1000, 9999);

/// Shared game snapshot stored under `game-<pin>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBlob {
    pub game_id: String,
    pub host: String,
    pub players: Vec<Player>,
    pub settings: SessionSettings,
    #[serde(default)]
    pub used_card_ids: BTreeSet<String>,
    #[serde(default)]
    pub skipped_card_ids: BTreeSet<String>,
    #[serde(default)]
    pub current_round_number: u32,
    #[serde(default)]
    pub current_screen: Option<Screen>,
    #[serde(default)]
    pub current_candidate_cards: Vec<Card>,
    #[serde(default)]
    pub current_selected_card: Option<Card>,
    pub last_updated: i64,
}

impl Session {
    pub fn game_info(&self) -> &GameInfo {
        &self.game
    }

    /// Hosts a new game with `host_name` as the only player and returns its pin.
    pub fn create_game(&mut self, host_name: &str) -> String {
        let host_name = host_name.trim().to_string();
        let pin = self
            .rng
            .range_inclusive(PIN_RANGE.0, PIN_RANGE.1)
            .to_string();
        let game_id = format!(
            "game-{}-{}",
            Utc::now().timestamp_millis(),
            self.rng.base36(9)
        );
        self.state.players = vec![Player::new(&host_name)];
        self.game = GameInfo {
            game_pin: Some(pin.clone()),
            is_host: true,
            player_name: Some(host_name),
            game_id: Some(game_id),
        };
        self.publish_game();
        info!("hosting game {pin}");
        self.set_screen(Screen::WaitingRoom);
        pin
    }

    /// Joins the game stored under `pin`. Fails when there is no readable blob.
    pub fn join_game(&mut self, pin: &str, name: &str) -> bool {
        let pin = pin.trim();
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let key = game_key(pin);
        let Some(mut blob) = read_json::<GameBlob>(self.store.as_ref(), &key) else {
            info!("no game found for pin {pin}");
            return false;
        };
        blob.players.push(Player::new(name));
        blob.last_updated = Utc::now().timestamp_millis();
        if let Err(err) = write_json(self.store.as_ref(), &key, &blob) {
            warn!("failed to publish join for game {pin}: {err}");
        }
        self.game = GameInfo {
            game_pin: Some(pin.to_string()),
            is_host: false,
            player_name: Some(name.to_string()),
            game_id: Some(blob.game_id.clone()),
        };
        let screen = blob.current_screen.unwrap_or(Screen::WaitingRoom);
        self.adopt_blob(blob);
        self.set_screen(screen);
        true
    }

    /// Host folds in newly joined players and publishes its state; guests
    /// adopt whatever the host last wrote.
    pub fn sync_game_state(&mut self) {
        let Some(pin) = self.game.game_pin.clone() else {
            return;
        };
        if self.game.is_host {
            self.merge_joined_players(&pin);
            self.publish_game();
            return;
        }
        let Some(blob) = read_json::<GameBlob>(self.store.as_ref(), &game_key(&pin)) else {
            return;
        };
        let screen = blob.current_screen.unwrap_or(self.state.current_screen);
        self.adopt_blob(blob);
        if screen != self.state.current_screen {
            self.set_screen(screen);
        }
    }

    fn merge_joined_players(&mut self, pin: &str) {
        let Some(blob) = read_json::<GameBlob>(self.store.as_ref(), &game_key(pin)) else {
            return;
        };
        for player in blob.players {
            if !self.state.players.iter().any(|known| known.id == player.id) {
                info!("{} joined game {pin}", player.name);
                self.state.players.push(player);
            }
        }
    }

    pub(super) fn publish_game(&self) {
        let Some(pin) = self.game.game_pin.as_deref() else {
            return;
        };
        let blob = GameBlob {
            game_id: self.game.game_id.clone().unwrap_or_default(),
            host: self.game.player_name.clone().unwrap_or_default(),
            players: self.state.players.clone(),
            settings: self.state.settings.clone(),
            used_card_ids: self.state.used_card_ids.clone(),
            skipped_card_ids: self.state.skipped_card_ids.clone(),
            current_round_number: self.state.current_round_number,
            current_screen: Some(self.state.current_screen),
            current_candidate_cards: self.state.current_candidate_cards.clone(),
            current_selected_card: self.state.current_selected_card.clone(),
            last_updated: Utc::now().timestamp_millis(),
        };
        if let Err(err) = write_json(self.store.as_ref(), &game_key(pin), &blob) {
            warn!("failed to publish game {pin}: {err}");
        }
    }

    fn adopt_blob(&mut self, blob: GameBlob) {
        self.state.players = blob.players;
        self.state.settings = blob.settings;
        self.state.used_card_ids = blob.used_card_ids;
        self.state.skipped_card_ids = blob.skipped_card_ids;
        self.state.current_round_number = blob.current_round_number;
        self.state.current_candidate_cards = blob.current_candidate_cards;
        self.state.current_selected_card = blob.current_selected_card;
    }
}
