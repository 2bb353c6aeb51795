use crate::{Card, RatingEntry, SessionSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    #[default]
    Welcome,
    CreateGame,
    JoinGame,
    SinglePlayer,
    WaitingRoom,
    SetupSession,
    InRound,
    AnswerPhase,
    ClosingGroup,
    ClosingPersonal,
    SessionSummary,
}

impl Screen {
    pub fn in_round_loop(self) -> bool {
        matches!(self, Self::InRound | Self::AnswerPhase)
    }

    pub fn in_closing(self) -> bool {
        matches!(
            self,
            Self::ClosingGroup | Self::ClosingPersonal | Self::SessionSummary
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub couple_group_id: Option<String>,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            couple_group_id: None,
        }
    }
}

/// Pin-based lobby membership for the shared-store game.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub game_pin: Option<String>,
    pub is_host: bool,
    pub player_name: Option<String>,
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub players: Vec<Player>,
    pub settings: SessionSettings,
    pub used_card_ids: BTreeSet<String>,
    pub skipped_card_ids: BTreeSet<String>,
    pub favorites: BTreeSet<String>,
    pub answered_in_current_cycle: BTreeSet<String>,
    pub card_ratings: Vec<RatingEntry>,
    pub current_round_number: u32,
    pub current_screen: Screen,
    pub current_candidate_cards: Vec<Card>,
    pub current_selected_card: Option<Card>,
    pub current_answering_player_id: Option<String>,
}

impl SessionState {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Clears everything tied to a single play-through. Players and settings stay.
    pub fn reset_progress(&mut self) {
        self.used_card_ids.clear();
        self.skipped_card_ids.clear();
        self.answered_in_current_cycle.clear();
        self.current_round_number = 0;
        self.current_candidate_cards.clear();
        self.current_selected_card = None;
        self.current_answering_player_id = None;
    }
}
